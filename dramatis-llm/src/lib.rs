//! # dramatis-llm — text-generator boundary for dramatis
//!
//! Everything that touches generated text lives here:
//!   - **Ingestion**: [`CharacterParser`] turns unreliable model output
//!     (fenced JSON, truncated JSON, labeled prose) into validated
//!     characters, and never returns an empty batch
//!   - **Prompts**: templates for cast creation, personas and narration,
//!     plus the per-turn [`prompt::character_context`]
//!   - **Client**: an OpenAI-compatible chat-completions client behind the
//!     [`TextGenerator`] trait, with timeout and retry
//!   - **Cast generation**: [`generate_cast`] ties the three together
//!
//! # Architecture
//!
//! ```text
//! topic ─▶ prompt ─▶ TextGenerator ─▶ raw text ─▶ CharacterParser ─▶ Vec<Character>
//!                         ▲                                              │
//!                         └──────────── retry on placeholder ────────────┘
//! ```

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod parser;
pub mod prompt;
pub mod types;
pub mod world;

pub use client::{LlmClient, LlmProvider, TextGenerator};
pub use error::LlmError;
pub use parser::{CharacterParser, ExtractionStrategy, ParseFailure, ParseReport, parse_characters};
pub use types::{CharacterRecord, LlmRequest, LlmResponse};
pub use world::{generate_cast, generate_cast_with};
