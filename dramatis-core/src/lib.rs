//! # Dramatis Core Library
//!
//! Character state engine for ensemble stories driven by a text generator.
//!
//! Every [`Character`] carries:
//!
//! - **Memory**: an append-only [`MemoryLog`] of timestamped,
//!   importance-weighted facts with recency, importance and search views
//! - **Emotions**: named intensities in `[0, 1]`, updated by events with
//!   opposing-pair suppression ([`emotion`])
//! - **Relationships**: one-directional trust/friendship records that the
//!   [`relationship`] manager always updates in both directions
//! - **Current state**: `energy`, `mood` and `health` gauges
//!
//! Out-of-range numbers are clamped, never rejected. Only missing identity
//! fields (name, affiliation, personality traits) or blank memory content
//! fail, with [`DramatisError::Validation`].
//!
//! The [`Cast`] roster owns the characters of one story and resolves names
//! for interactions.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cast;
pub mod character;
pub mod config;
pub mod emotion;
pub mod error;
pub mod memory;
pub mod relationship;
pub mod types;

pub use cast::Cast;
pub use character::{Character, CharacterDraft, CurrentState, StateField};
pub use config::DramatisConfig;
pub use emotion::{Emotion, dominant_emotion, mood, process_event};
pub use error::{DramatisError, Result};
pub use memory::{Memory, MemoryLog, MemorySeed};
pub use relationship::{
    DEFAULT_INTERACTION_INTENSITY, InteractionKind, Relationship, process_interaction,
    relationship_summary,
};
pub use types::*;
