//! Core types for LLM requests, responses, and extracted character records.

use dramatis_core::config::LlmConfig;
use dramatis_core::{CharacterDraft, MemorySeed};
use serde::{Deserialize, Serialize};

/// A chat-style request to the text generator.
#[derive(Debug, Clone, Serialize)]
pub struct LlmRequest {
    /// System prompt (persona, output format, rules).
    pub system: String,
    /// User prompt (topic, conversation so far, instruction).
    pub user: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl LlmRequest {
    /// Create a request with the default sampling settings.
    #[must_use]
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        let defaults = LlmConfig::default();
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            timeout_ms: defaults.timeout_ms,
        }
    }

    /// Take sampling settings and timeout from `config`.
    #[must_use]
    pub fn with_config(mut self, config: &LlmConfig) -> Self {
        self.max_tokens = config.max_tokens;
        self.temperature = config.temperature;
        self.timeout_ms = config.timeout_ms;
        self
    }
}

/// A response from the text generator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmResponse {
    /// The generated text.
    pub text: String,
    /// How many tokens were generated.
    pub tokens_generated: u32,
    /// Latency in milliseconds.
    pub latency_ms: u64,
    /// Which model was used.
    pub model: String,
}

impl LlmResponse {
    /// A response carrying only text (scripted generators, tests).
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// One character as extracted from generated text, before validation.
///
/// Every field is already normalized (synonyms resolved, lists split), but
/// nothing guarantees the required fields are non-blank: that is checked
/// when the record becomes a [`dramatis_core::Character`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// Name.
    pub name: String,
    /// Group label (`tribe` / `affiliation` / `group`).
    #[serde(alias = "tribe", alias = "group")]
    pub affiliation: String,
    /// Skills.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Starting memories.
    #[serde(default, alias = "memories")]
    pub memory: Vec<MemorySeed>,
    /// Personality traits.
    #[serde(default, alias = "traits")]
    pub personality_traits: Vec<String>,
    /// Narrative archetype.
    #[serde(default)]
    pub archetype: Option<String>,
    /// Story role.
    #[serde(default)]
    pub role: Option<String>,
    /// Free-text history.
    #[serde(default)]
    pub backstory: Option<String>,
    /// Beliefs.
    #[serde(default)]
    pub beliefs: Vec<String>,
    /// Goals.
    #[serde(default)]
    pub goals: Vec<String>,
}

impl CharacterRecord {
    /// Convert into a construction draft. Empty skill and memory lists are
    /// passed through so the configured placeholders apply.
    #[must_use]
    pub fn into_draft(self) -> CharacterDraft {
        CharacterDraft {
            name: self.name,
            affiliation: self.affiliation,
            personality_traits: self.personality_traits,
            skills: Some(self.skills),
            memory: Some(self.memory),
            archetype: self.archetype,
            role: self.role,
            backstory: self.backstory,
            beliefs: self.beliefs,
            goals: self.goals,
        }
    }
}
