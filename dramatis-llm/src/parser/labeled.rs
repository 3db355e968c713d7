//! Labeled-field strategy: `Name: ...` / `Tribe: ...` style prose.
//!
//! Text is split into blocks at `Character N:` headers and at `Name:` lines
//! that would otherwise give a block a second name. Each block is then read
//! line by line. Markdown bullets and bold markers around labels are
//! tolerated, and a list label with nothing after the colon collects the
//! bullet lines that follow it.

use dramatis_core::MemorySeed;
use dramatis_core::config::ParserConfig;
use regex::Regex;
use tracing::debug;

use super::{ExtractionStrategy, ParseFailure};
use crate::types::CharacterRecord;

/// The fields a label can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Header,
    Name,
    Affiliation,
    Skills,
    Memory,
    Traits,
    Archetype,
    Role,
    Backstory,
}

impl Field {
    fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        let label = label.split_whitespace().collect::<Vec<_>>().join(" ");
        Some(match label.as_str() {
            "name" => Self::Name,
            "tribe" | "affiliation" | "group" => Self::Affiliation,
            "skills" => Self::Skills,
            "memory" | "memories" => Self::Memory,
            "personality traits" | "personality_traits" | "traits" => Self::Traits,
            "archetype" => Self::Archetype,
            "role" => Self::Role,
            "backstory" => Self::Backstory,
            other if other.starts_with("character ") => Self::Header,
            _ => return None,
        })
    }

    fn is_list(self) -> bool {
        matches!(self, Self::Skills | Self::Memory | Self::Traits)
    }
}

/// Fields gathered from one block.
#[derive(Debug, Default)]
struct Block {
    header_name: Option<String>,
    name: Option<String>,
    affiliation: Option<String>,
    skills: Option<Vec<String>>,
    memory: Option<Vec<String>>,
    traits: Option<Vec<String>>,
    archetype: Option<String>,
    role: Option<String>,
    backstory: Option<String>,
    labels: usize,
}

impl Block {
    fn list_mut(&mut self, field: Field) -> Option<&mut Option<Vec<String>>> {
        match field {
            Field::Skills => Some(&mut self.skills),
            Field::Memory => Some(&mut self.memory),
            Field::Traits => Some(&mut self.traits),
            _ => None,
        }
    }

    /// Record a label. The first occurrence of each field wins.
    fn set(&mut self, field: Field, value: &str) {
        self.labels += 1;
        let text = clean_scalar(value);
        let slot = match field {
            Field::Header => &mut self.header_name,
            Field::Name => &mut self.name,
            Field::Affiliation => &mut self.affiliation,
            Field::Archetype => &mut self.archetype,
            Field::Role => &mut self.role,
            Field::Backstory => &mut self.backstory,
            list => {
                if let Some(slot) = self.list_mut(list)
                    && slot.is_none()
                {
                    *slot = Some(parse_list(value));
                }
                return;
            }
        };
        if slot.is_none() && !text.is_empty() {
            *slot = Some(text);
        }
    }
}

/// Reads characters described as labeled lines.
#[derive(Debug, Clone)]
pub struct LabeledStrategy {
    label_line: Regex,
    bullet_line: Regex,
    unknown_name: String,
    unknown_affiliation: String,
}

impl LabeledStrategy {
    /// Build the strategy from parser settings.
    ///
    /// # Panics
    /// Never in practice: the patterns are fixed and known to compile.
    #[must_use]
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            label_line: Regex::new(
                r"(?i)^\s*(?:[-*+]\s+|\d+[.)]\s+|#+\s*)?(?:\*\*|__)?\s*(character\s+\d+|name|tribe|affiliation|group|skills|memory|memories|personality[ _]traits|traits|archetype|role|backstory)\s*(?:\*\*|__)?\s*:\s*(?:\*\*|__)?\s*(.*?)\s*$",
            )
            .expect("Invalid regex"),
            bullet_line: Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+(.+?)\s*$").expect("Invalid regex"),
            unknown_name: config.unknown_labeled_name.clone(),
            unknown_affiliation: config.unknown_affiliation.clone(),
        }
    }

    fn label<'t>(&self, line: &'t str) -> Option<(Field, &'t str)> {
        let caps = self.label_line.captures(line)?;
        let field = Field::from_label(caps.get(1)?.as_str())?;
        let value = caps.get(2).map_or("", |m| m.as_str());
        Some((field, value.trim_end_matches(['*', '_']).trim()))
    }

    fn blocks(&self, text: &str) -> Vec<Block> {
        let mut blocks = vec![Block::default()];
        let mut pending_list: Option<Field> = None;

        for line in text.lines() {
            if let Some((field, value)) = self.label(line) {
                let starts_new = match field {
                    Field::Header => blocks.last().is_some_and(|b| b.labels > 0),
                    Field::Name => blocks.last().is_some_and(|b| b.name.is_some()),
                    _ => false,
                };
                if starts_new {
                    blocks.push(Block::default());
                }
                if let Some(block) = blocks.last_mut() {
                    block.set(field, value);
                }
                pending_list = (field.is_list() && value.is_empty()).then_some(field);
                continue;
            }

            let Some(field) = pending_list else { continue };
            match self.bullet_line.captures(line) {
                Some(caps) => {
                    let item = caps.get(1).map_or("", |m| m.as_str());
                    if let Some(list) = blocks
                        .last_mut()
                        .and_then(|block| block.list_mut(field))
                        .and_then(Option::as_mut)
                    {
                        list.extend(parse_list(item));
                    }
                }
                None if line.trim().is_empty() => {}
                None => pending_list = None,
            }
        }

        blocks.retain(|block| block.labels > 0);
        blocks
    }

    fn record_from(&self, block: Block) -> CharacterRecord {
        CharacterRecord {
            name: block
                .name
                .or(block.header_name)
                .unwrap_or_else(|| self.unknown_name.clone()),
            affiliation: block
                .affiliation
                .unwrap_or_else(|| self.unknown_affiliation.clone()),
            skills: block.skills.unwrap_or_default(),
            memory: block
                .memory
                .unwrap_or_default()
                .into_iter()
                .map(MemorySeed::from)
                .collect(),
            personality_traits: block.traits.unwrap_or_default(),
            archetype: block.archetype,
            role: block.role,
            backstory: block.backstory,
            beliefs: Vec::new(),
            goals: Vec::new(),
        }
    }
}

impl ExtractionStrategy for LabeledStrategy {
    fn name(&self) -> &'static str {
        "labeled"
    }

    fn extract(&self, text: &str) -> Result<Vec<CharacterRecord>, ParseFailure> {
        let blocks = self.blocks(text);
        if blocks.is_empty() {
            return Err(ParseFailure::NoLabeledBlocks);
        }
        debug!(blocks = blocks.len(), "Found labeled character blocks");
        Ok(blocks.into_iter().map(|block| self.record_from(block)).collect())
    }
}

/// Strip one layer of enclosing brackets, split on commas, and trim
/// whitespace and quotes from each item. Empty items are dropped.
#[must_use]
pub fn parse_list(text: &str) -> Vec<String> {
    let text = text.trim();
    let text = text.strip_prefix('[').unwrap_or(text);
    let text = text.strip_suffix(']').unwrap_or(text);
    text.split(',')
        .map(|item| item.trim().trim_matches(['"', '\'']).trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean_scalar(value: &str) -> String {
    value.trim().trim_matches(['"', '\'', '*']).trim().to_string()
}
