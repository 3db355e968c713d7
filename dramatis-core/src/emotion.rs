//! Emotional Engine — event-driven emotion updates with opposing-pair
//! suppression, plus dominant-emotion and mood queries.
//!
//! The emotion set itself is the state: each recorded name maps to an
//! intensity in `[0, 1]`. There is no separate state enum.
//!
//! Strengthening one pole of an opposing pair weakens the other by half the
//! magnitude of the change, but only when the opposite has already been
//! recorded. Pairs are never created speculatively.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::character::{Character, normalize_emotion};
use crate::types::clamp_unit;

/// Opposing emotion pairs. Suppression applies in both directions.
pub const EMOTION_PAIRS: [(&str, &str); 4] = [
    ("joy", "sadness"),
    ("anger", "fear"),
    ("trust", "disgust"),
    ("anticipation", "surprise"),
];

/// Emotions that raise [`mood`].
pub const POSITIVE_EMOTIONS: [&str; 3] = ["joy", "trust", "anticipation"];

/// Emotions that lower [`mood`].
pub const NEGATIVE_EMOTIONS: [&str; 4] = ["sadness", "fear", "disgust", "anger"];

/// Mood reported for a character with no emotions.
pub const NEUTRAL_MOOD: f32 = 0.5;

/// A named emotion and its intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emotion {
    /// Lowercase emotion name.
    pub name: String,
    /// Intensity in `[0, 1]`.
    pub intensity: f32,
}

impl Emotion {
    /// Create an emotion, clamping the intensity.
    #[must_use]
    pub fn new(name: impl Into<String>, intensity: f32) -> Self {
        Self {
            name: name.into(),
            intensity: clamp_unit(intensity),
        }
    }

    /// Replace the intensity, clamping it.
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = clamp_unit(intensity);
    }
}

/// The canonical opposite of `name`, if it belongs to a pair.
#[must_use]
pub fn opposite_of(name: &str) -> Option<&'static str> {
    let name = normalize_emotion(name);
    EMOTION_PAIRS.iter().find_map(|&(a, b)| {
        if a == name {
            Some(b)
        } else if b == name {
            Some(a)
        } else {
            None
        }
    })
}

/// Apply an event's emotion deltas to `character`, in the order given.
///
/// Each delta moves its emotion to `clamp(current + delta, 0, 1)`, recording
/// the emotion if new. If the emotion has an opposite that the character
/// already feels, the opposite drops by `|delta| / 2`, floored at 0.
/// Non-finite deltas are skipped.
pub fn process_event<I, K>(character: &mut Character, event: &str, emotion_changes: I)
where
    I: IntoIterator<Item = (K, f32)>,
    K: AsRef<str>,
{
    for (name, delta) in emotion_changes {
        let name = name.as_ref();
        if !delta.is_finite() {
            warn!(character = %character.name(), emotion = name, "Ignoring non-finite emotion delta");
            continue;
        }

        let current = character.emotion(name).unwrap_or(0.0);
        let Some(updated) = character.update_emotion(name, current + delta) else {
            continue;
        };
        debug!(
            character = %character.name(),
            event,
            emotion = name,
            delta,
            intensity = updated,
            "Emotion updated"
        );

        if let Some(opposite) = opposite_of(name)
            && let Some(opposite_current) = character.emotion(opposite)
        {
            let suppressed = character
                .update_emotion(opposite, opposite_current - delta.abs() / 2.0)
                .unwrap_or(0.0);
            debug!(
                character = %character.name(),
                emotion = opposite,
                intensity = suppressed,
                "Opposite emotion suppressed"
            );
        }
    }
}

/// The most intense emotion, or `None` if none are recorded.
///
/// Ties resolve to the emotion recorded first.
#[must_use]
pub fn dominant_emotion(character: &Character) -> Option<&str> {
    let mut best: Option<&Emotion> = None;
    for emotion in character.emotions().values() {
        if best.is_none_or(|current| emotion.intensity > current.intensity) {
            best = Some(emotion);
        }
    }
    best.map(|emotion| emotion.name.as_str())
}

/// Overall mood from the eight canonical emotions.
///
/// `(positive_sum - negative_sum) / k + 0.5`, where `k` counts how many of
/// the eight are recorded. Returns [`NEUTRAL_MOOD`] when `k` is zero.
///
/// The result is not re-clamped and can leave `[0, 1]` (for example a lone
/// maxed joy gives 1.5). Treat it as advisory.
#[must_use]
pub fn mood(character: &Character) -> f32 {
    let emotions = character.emotions();
    if emotions.is_empty() {
        return NEUTRAL_MOOD;
    }

    let mut counted = 0_u8;
    let mut sum_of = |names: &[&str]| -> f32 {
        names
            .iter()
            .filter_map(|name| emotions.get(*name))
            .map(|emotion| {
                counted += 1;
                emotion.intensity
            })
            .sum()
    };
    let positive = sum_of(&POSITIVE_EMOTIONS);
    let negative = sum_of(&NEGATIVE_EMOTIONS);

    if counted == 0 {
        return NEUTRAL_MOOD;
    }
    (positive - negative) / f32::from(counted) + NEUTRAL_MOOD
}
