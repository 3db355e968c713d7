//! Error types for the dramatis core library.

use thiserror::Error;

/// Top-level error type for all dramatis core operations.
///
/// Out-of-range numeric inputs (importance, intensities, trust, friendship,
/// state values) are never errors: they are clamped silently.
#[derive(Error, Debug)]
pub enum DramatisError {
    /// A required field was missing, blank, or malformed on direct construction.
    #[error("Validation failed for `{field}`: {reason}")]
    Validation {
        /// The offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// No character with this name exists in the cast.
    #[error("Character not found: {0}")]
    CharacterNotFound(String),

    /// A character with this name is already in the cast.
    #[error("Duplicate character: {0}")]
    DuplicateCharacter(String),

    /// A character cannot interact with itself.
    #[error("Character cannot interact with itself: {0}")]
    SelfInteraction(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DramatisError {
    /// Shorthand for a [`DramatisError::Validation`].
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, DramatisError>;
