//! Relationship Manager — symmetric interaction effects on trust and
//! friendship, and human-readable relationship summaries.
//!
//! Records are one-directional and owned by the holder. Every interaction
//! updates both directions with the same scaled deltas, so the graph stays
//! logically symmetric even though the two records are independent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::character::Character;
use crate::types::clamp_unit;

/// Trust and friendship of a freshly created record.
pub const DEFAULT_BOND: f32 = 0.5;

/// Intensity of an interaction when the caller has no stronger signal.
pub const DEFAULT_INTERACTION_INTENSITY: f32 = 0.1;

/// One character's view of another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Name of the other party.
    pub character_name: String,
    /// Trust in `[0, 1]`.
    pub trust: f32,
    /// Friendship in `[0, 1]`.
    pub friendship: f32,
    /// Append-only log of what happened between them.
    pub history: Vec<String>,
}

impl Relationship {
    /// A neutral record toward `character_name`.
    #[must_use]
    pub fn new(character_name: impl Into<String>) -> Self {
        Self {
            character_name: character_name.into(),
            trust: DEFAULT_BOND,
            friendship: DEFAULT_BOND,
            history: Vec::new(),
        }
    }

    /// Shift trust and friendship, clamping each to `[0, 1]`.
    /// Non-finite deltas leave the value unchanged.
    pub fn adjust(&mut self, trust_delta: f32, friendship_delta: f32) {
        if trust_delta.is_finite() {
            self.trust = clamp_unit(self.trust + trust_delta);
        }
        if friendship_delta.is_finite() {
            self.friendship = clamp_unit(self.friendship + friendship_delta);
        }
    }

    /// Bucketed trust.
    #[must_use]
    pub fn trust_level(&self) -> TrustLevel {
        match self.trust {
            t if t > 0.7 => TrustLevel::High,
            t if t > 0.3 => TrustLevel::Moderate,
            _ => TrustLevel::Low,
        }
    }

    /// Bucketed friendship.
    #[must_use]
    pub fn friendship_level(&self) -> FriendshipLevel {
        match self.friendship {
            f if f > 0.7 => FriendshipLevel::Strong,
            f if f > 0.3 => FriendshipLevel::Moderate,
            _ => FriendshipLevel::Weak,
        }
    }
}

/// Trust bucket: low `<= 0.3`, moderate `<= 0.7`, high above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustLevel {
    /// Trust at or below 0.3.
    Low,
    /// Trust above 0.3 and at most 0.7.
    Moderate,
    /// Trust above 0.7.
    High,
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        })
    }
}

/// Friendship bucket: weak `<= 0.3`, moderate `<= 0.7`, strong above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipLevel {
    /// Friendship at or below 0.3.
    Weak,
    /// Friendship above 0.3 and at most 0.7.
    Moderate,
    /// Friendship above 0.7.
    Strong,
}

impl fmt::Display for FriendshipLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        })
    }
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

/// The kinds of interaction with a defined effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// A friendly exchange: `(+0.1, +0.1)`.
    Positive,
    /// An unfriendly exchange: `(-0.1, -0.1)`.
    Negative,
    /// Small talk: `(0.0, +0.05)`.
    Neutral,
    /// An argument or fight: `(-0.15, -0.05)`.
    Conflict,
    /// Working together: `(+0.15, +0.1)`.
    Cooperation,
    /// A broken confidence: `(-0.3, -0.2)`.
    Betrayal,
}

impl InteractionKind {
    /// Every kind, in table order.
    pub const ALL: [Self; 6] = [
        Self::Positive,
        Self::Negative,
        Self::Neutral,
        Self::Conflict,
        Self::Cooperation,
        Self::Betrayal,
    ];

    /// Unscaled `(trust_delta, friendship_delta)`.
    #[must_use]
    pub fn effect(self) -> (f32, f32) {
        match self {
            Self::Positive => (0.1, 0.1),
            Self::Negative => (-0.1, -0.1),
            Self::Neutral => (0.0, 0.05),
            Self::Conflict => (-0.15, -0.05),
            Self::Cooperation => (0.15, 0.1),
            Self::Betrayal => (-0.3, -0.2),
        }
    }

    /// Lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Conflict => "conflict",
            Self::Cooperation => "cooperation",
            Self::Betrayal => "betrayal",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("unknown interaction kind: '{s}'"))
    }
}

/// Apply an interaction named by `interaction_type` between `a` and `b`.
///
/// Unknown kinds are ignored and return `None`. Known kinds return the
/// parsed [`InteractionKind`] after applying it with [`apply_interaction`].
pub fn process_interaction(
    a: &mut Character,
    b: &mut Character,
    interaction_type: &str,
    intensity: f32,
) -> Option<InteractionKind> {
    let Ok(kind) = interaction_type.parse::<InteractionKind>() else {
        debug!(
            a = %a.name(),
            b = %b.name(),
            interaction_type,
            "Ignoring unknown interaction kind"
        );
        return None;
    };
    apply_interaction(a, b, kind, intensity).then_some(kind)
}

/// Apply a typed interaction to both directions of the relationship.
///
/// Deltas are the kind's effect scaled by `intensity`; each side's record is
/// created at 0.5 / 0.5 if missing, then clamped independently, and gets one
/// history line. Returns `false` (and changes nothing) if `intensity` is not
/// finite.
pub fn apply_interaction(
    a: &mut Character,
    b: &mut Character,
    kind: InteractionKind,
    intensity: f32,
) -> bool {
    if !intensity.is_finite() {
        warn!(a = %a.name(), b = %b.name(), %kind, "Ignoring non-finite interaction intensity");
        return false;
    }

    let (trust, friendship) = kind.effect();
    let (trust_delta, friendship_delta) = (trust * intensity, friendship * intensity);

    let a_name = a.name().to_string();
    let b_name = b.name().to_string();

    a.update_relationship(&b_name, trust_delta, friendship_delta);
    a.record_history(&b_name, format!("{kind} with {b_name} (intensity {intensity:.2})"));
    b.update_relationship(&a_name, trust_delta, friendship_delta);
    b.record_history(&a_name, format!("{kind} with {a_name} (intensity {intensity:.2})"));

    debug!(
        a = %a_name,
        b = %b_name,
        %kind,
        trust_delta,
        friendship_delta,
        "Interaction applied"
    );
    true
}

/// One-line description of how `character` regards `other`.
#[must_use]
pub fn relationship_summary(character: &Character, other: &str) -> String {
    match character.relationship(other) {
        None => format!(
            "{} has no established relationship with {other}.",
            character.name()
        ),
        Some(relationship) => format!(
            "{}'s relationship with {other}: {} trust, {} friendship.",
            character.name(),
            relationship.trust_level(),
            relationship.friendship_level()
        ),
    }
}
