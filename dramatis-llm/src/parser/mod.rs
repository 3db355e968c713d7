//! Ingestion Parser — turns unreliable generated text into validated
//! characters.
//!
//! The fallback chain is data: a [`CharacterParser`] holds an ordered list
//! of [`ExtractionStrategy`] values and takes the records from the first one
//! that returns `Ok`. Records are then validated through
//! [`Character::from_draft_with`]; invalid ones are dropped. If nothing
//! survives, the configured placeholder character is returned, so parsing
//! never yields an empty batch and never fails.
//!
//! ```text
//! raw text ─▶ strip fences ─▶ structured ─┬─ Ok ─▶ validate ─▶ [chars] or [placeholder]
//!                                         └─ Err ─▶ labeled ─┬─ Ok ─▶ validate ─▶ ...
//!                                                            └─ Err ─▶ [placeholder]
//! ```

pub mod labeled;
pub mod normalize;
pub mod structured;

use dramatis_core::Character;
use dramatis_core::config::{CharacterConfig, DramatisConfig, PlaceholderConfig};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use labeled::LabeledStrategy;
pub use structured::StructuredStrategy;

use crate::types::CharacterRecord;

/// Why a single strategy produced nothing. Never escapes the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// The text contains no `{` to start a structured object.
    #[error("no structured object found")]
    NoObject,
    /// Every repair candidate failed to decode.
    #[error("structured data could not be decoded: {0}")]
    Decode(String),
    /// No line carried a recognised field label.
    #[error("no labeled character blocks found")]
    NoLabeledBlocks,
}

/// One way of pulling character records out of normalized text.
pub trait ExtractionStrategy: Send + Sync {
    /// Short name for logs and [`ParseReport::strategy`].
    fn name(&self) -> &'static str;

    /// Extract records, or explain why this strategy does not apply.
    ///
    /// # Errors
    /// Returns a [`ParseFailure`] when the strategy finds nothing it can read;
    /// the parser then moves on to the next strategy.
    fn extract(&self, text: &str) -> Result<Vec<CharacterRecord>, ParseFailure>;
}

/// What a parse produced and how.
#[derive(Debug, Clone)]
pub struct ParseReport {
    /// Validated characters; never empty.
    pub characters: Vec<Character>,
    /// The strategy whose records were used, if any succeeded.
    pub strategy: Option<&'static str>,
    /// Records dropped because they failed validation.
    pub skipped: usize,
    /// Whether `characters` is just the placeholder.
    pub placeholder: bool,
}

/// Multi-strategy character parser.
pub struct CharacterParser {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    character: CharacterConfig,
    placeholder: PlaceholderConfig,
    log_preview_chars: usize,
}

impl CharacterParser {
    /// A parser with default settings: structured, then labeled.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&DramatisConfig::default())
    }

    /// A parser using the `[parser]` and `[character]` sections of `config`.
    #[must_use]
    pub fn from_config(config: &DramatisConfig) -> Self {
        Self {
            strategies: vec![
                Box::new(StructuredStrategy::new(&config.parser)),
                Box::new(LabeledStrategy::new(&config.parser)),
            ],
            character: config.character.clone(),
            placeholder: config.parser.placeholder.clone(),
            log_preview_chars: config.parser.log_preview_chars,
        }
    }

    /// Replace the strategy chain.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Names of the strategies, in the order they are tried.
    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Parse `text` into at least one character.
    #[must_use]
    pub fn parse(&self, text: &str) -> Vec<Character> {
        self.parse_report(text).characters
    }

    /// Parse `text`, reporting which strategy was used and what was dropped.
    #[must_use]
    pub fn parse_report(&self, text: &str) -> ParseReport {
        let cleaned = normalize::strip_code_fences(text);
        let text = cleaned.as_str();
        debug!(
            preview = normalize::preview(text, self.log_preview_chars),
            "Attempting to parse character batch"
        );

        let mut report = ParseReport {
            characters: Vec::new(),
            strategy: None,
            skipped: 0,
            placeholder: false,
        };

        for strategy in &self.strategies {
            let records = match strategy.extract(text) {
                Ok(records) => records,
                Err(failure) => {
                    debug!(strategy = strategy.name(), %failure, "Strategy failed, trying next");
                    continue;
                }
            };
            info!(strategy = strategy.name(), records = records.len(), "Extracted character records");
            report.strategy = Some(strategy.name());

            for record in records {
                let name = record.name.clone();
                match Character::from_draft_with(record.into_draft(), &self.character) {
                    Ok(character) => report.characters.push(character),
                    Err(err) => {
                        warn!(character = %name, %err, "Dropping invalid character record");
                        report.skipped += 1;
                    }
                }
            }
            break;
        }

        if report.characters.is_empty() {
            warn!("No characters could be parsed, using placeholder");
            report.characters.push(self.placeholder());
            report.placeholder = true;
        }
        report
    }

    /// The configured fallback-of-last-resort character.
    #[must_use]
    pub fn placeholder(&self) -> Character {
        Character::placeholder(&self.placeholder, &self.character)
    }
}

impl Default for CharacterParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CharacterParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterParser")
            .field("strategies", &self.strategy_names())
            .field("placeholder", &self.placeholder.name)
            .finish_non_exhaustive()
    }
}

/// Parse with default settings.
#[must_use]
pub fn parse_characters(text: &str) -> Vec<Character> {
    CharacterParser::new().parse(text)
}
