//! Shared value types: identities, timestamps, bounded scalars.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for a memory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryId(pub Uuid);

impl MemoryId {
    /// Create a new random memory ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Last issued stamp, in microseconds since the Unix epoch.
static LAST_ISSUED_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Wall-clock creation instant of a memory.
///
/// [`Timestamp::now`] never returns the same or an earlier instant twice within
/// a process, so ordering by timestamp is ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// The current instant, strictly later than any stamp previously issued
    /// by this function.
    #[must_use]
    pub fn now() -> Self {
        let wall = Utc::now().timestamp_micros();
        let previous = LAST_ISSUED_MICROS
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(wall.max(last.saturating_add(1)))
            })
            .unwrap_or(wall);
        let issued = wall.max(previous.saturating_add(1));
        Self(DateTime::from_timestamp_micros(issued).unwrap_or_else(Utc::now))
    }

    /// Wrap an explicit instant (back-dated imports, tests).
    #[must_use]
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// The wrapped wall-clock instant.
    #[must_use]
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Time elapsed between this stamp and `now` (zero if `now` is earlier).
    #[must_use]
    pub fn age_at(&self, now: DateTime<Utc>) -> TimeDelta {
        (now - self.0).max(TimeDelta::zero())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.6f"))
    }
}

// ---------------------------------------------------------------------------
// Bounded scalars
// ---------------------------------------------------------------------------

/// Clamp to the unit interval. NaN collapses to 0.0.
#[must_use]
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Lowest storable memory importance.
pub const MIN_IMPORTANCE: u8 = 1;
/// Highest storable memory importance.
pub const MAX_IMPORTANCE: u8 = 10;

/// Clamp an arbitrary importance into `[MIN_IMPORTANCE, MAX_IMPORTANCE]`.
#[must_use]
pub fn clamp_importance(importance: i64) -> u8 {
    let clamped = importance.clamp(i64::from(MIN_IMPORTANCE), i64::from(MAX_IMPORTANCE));
    u8::try_from(clamped).unwrap_or(MIN_IMPORTANCE)
}
