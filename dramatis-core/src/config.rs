//! Configuration for the dramatis engine.
//!
//! Maps directly to `dramatis.toml`. Every section and field has a default,
//! so a partial file (or none at all) is valid.

use serde::{Deserialize, Serialize};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DramatisConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Leniency defaults applied when constructing characters.
    #[serde(default)]
    pub character: CharacterConfig,
    /// Memory query settings.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Ingestion parser settings.
    #[serde(default)]
    pub parser: ParserConfig,
    /// Text-generation backend settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

impl DramatisConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `DramatisError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::DramatisError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level the host should install: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Defaults used when a character is built from partial input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterConfig {
    /// Skill given to characters constructed without any.
    #[serde(default = "default_skill")]
    pub default_skill: String,
    /// Memory given to characters constructed without any.
    #[serde(default = "default_memory")]
    pub default_memory: String,
    /// Starting `energy` in `current_state`.
    #[serde(default = "default_1_0")]
    pub initial_energy: f32,
    /// Starting `mood` in `current_state`.
    #[serde(default = "default_0_5")]
    pub initial_mood: f32,
    /// Starting `health` in `current_state`.
    #[serde(default = "default_1_0")]
    pub initial_health: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            default_skill: default_skill(),
            default_memory: default_memory(),
            initial_energy: 1.0,
            initial_mood: 0.5,
            initial_health: 1.0,
        }
    }
}

/// Memory query settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// How many memories a summary lists.
    #[serde(default = "default_5_usize")]
    pub summary_limit: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { summary_limit: 5 }
    }
}

/// Ingestion parser settings: field fallbacks and the placeholder character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Whether unbalanced `{`/`[` are closed before giving up on structured data.
    #[serde(default = "default_true")]
    pub auto_close_braces: bool,
    /// Name used when a structured entry has none.
    #[serde(default = "default_unknown")]
    pub unknown_name: String,
    /// Name used when a labeled block has none.
    #[serde(default = "default_unknown_character")]
    pub unknown_labeled_name: String,
    /// Affiliation used when an entry has none.
    #[serde(default = "default_unknown_group")]
    pub unknown_affiliation: String,
    /// How many characters of the input are echoed to the debug log.
    #[serde(default = "default_200_usize")]
    pub log_preview_chars: usize,
    /// The character synthesised when nothing valid could be extracted.
    #[serde(default)]
    pub placeholder: PlaceholderConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            auto_close_braces: true,
            unknown_name: default_unknown(),
            unknown_labeled_name: default_unknown_character(),
            unknown_affiliation: default_unknown_group(),
            log_preview_chars: 200,
            placeholder: PlaceholderConfig::default(),
        }
    }
}

/// Field values of the fallback-of-last-resort character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderConfig {
    /// Placeholder name.
    #[serde(default = "default_placeholder_name")]
    pub name: String,
    /// Placeholder affiliation.
    #[serde(default = "default_unknown")]
    pub affiliation: String,
    /// Placeholder skills.
    #[serde(default = "default_placeholder_skills")]
    pub skills: Vec<String>,
    /// Placeholder memories.
    #[serde(default = "default_placeholder_memory")]
    pub memory: Vec<String>,
    /// Placeholder personality traits. Must not be empty.
    #[serde(default = "default_placeholder_traits")]
    pub personality_traits: Vec<String>,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            name: default_placeholder_name(),
            affiliation: default_unknown(),
            skills: default_placeholder_skills(),
            memory: default_placeholder_memory(),
            personality_traits: default_placeholder_traits(),
        }
    }
}

/// Text-generation backend settings (OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the chat-completions API.
    #[serde(default = "default_llm_url")]
    pub base_url: String,
    /// Bearer token, if the endpoint needs one.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Attempts made before giving up on a generation.
    #[serde(default = "default_3")]
    pub max_retries: u32,
    /// Per-request timeout.
    #[serde(default = "default_30000")]
    pub timeout_ms: u64,
    /// Sampling temperature.
    #[serde(default = "default_0_7")]
    pub temperature: f32,
    /// Maximum tokens per completion.
    #[serde(default = "default_1024")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_url(),
            api_key: None,
            model: default_model(),
            max_retries: 3,
            timeout_ms: 30_000,
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_skill() -> String { "Adaptability".to_string() }
fn default_memory() -> String { "I am new to this story".to_string() }
fn default_unknown() -> String { "Unknown".to_string() }
fn default_unknown_character() -> String { "Unknown Character".to_string() }
fn default_unknown_group() -> String { "Unknown Group".to_string() }
fn default_placeholder_name() -> String { "Default Character".to_string() }
fn default_placeholder_skills() -> Vec<String> { vec!["Adaptability".to_string()] }
fn default_placeholder_memory() -> Vec<String> { vec!["I am a mysterious character".to_string()] }
fn default_placeholder_traits() -> Vec<String> { vec!["Mysterious".to_string()] }
fn default_llm_url() -> String { "http://localhost:1234/v1".to_string() }
fn default_model() -> String { "llama-3.2-1b-instruct".to_string() }
fn default_0_5() -> f32 { 0.5 }
fn default_0_7() -> f32 { 0.7 }
fn default_1_0() -> f32 { 1.0 }
fn default_3() -> u32 { 3 }
fn default_5_usize() -> usize { 5 }
fn default_200_usize() -> usize { 200 }
fn default_1024() -> u32 { 1024 }
fn default_30000() -> u64 { 30_000 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = DramatisConfig::from_toml("").expect("empty config is valid");
        assert_eq!(config.memory.summary_limit, 5);
        assert_eq!(config.character.default_skill, "Adaptability");
        assert_eq!(config.parser.placeholder.name, "Default Character");
        assert_eq!(config.llm.model, "llama-3.2-1b-instruct");
        assert!(config.parser.auto_close_braces);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = DramatisConfig::from_toml(
            r#"
            [memory]
            summary_limit = 3

            [llm]
            base_url = "http://127.0.0.1:8080/v1"
            "#,
        )
        .expect("valid config");
        assert_eq!(config.memory.summary_limit, 3);
        assert_eq!(config.llm.base_url, "http://127.0.0.1:8080/v1");
        assert_eq!(config.llm.max_retries, 3);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = DramatisConfig::from_toml("[memory\nsummary_limit = ").expect_err("malformed toml");
        assert!(matches!(err, crate::DramatisError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[parser]\nunknown_affiliation = \"Drifters\"").expect("write");
        let config = DramatisConfig::from_file(file.path()).expect("load");
        assert_eq!(config.parser.unknown_affiliation, "Drifters");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = DramatisConfig::from_file(std::path::Path::new("/nonexistent/dramatis.toml"))
            .expect_err("missing file");
        assert!(matches!(err, crate::DramatisError::Io(_)));
    }
}
