//! Structured-data strategy: find a JSON object, repair it, read entries.

use dramatis_core::MemorySeed;
use dramatis_core::config::ParserConfig;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::normalize::{auto_close, object_span, object_tail, strip_comments, strip_trailing_commas};
use super::{ExtractionStrategy, ParseFailure};
use crate::types::CharacterRecord;

const AFFILIATION_KEYS: [&str; 3] = ["tribe", "affiliation", "group"];
const MEMORY_KEYS: [&str; 2] = ["memory", "memories"];
const TRAIT_KEYS: [&str; 2] = ["personality_traits", "traits"];

/// Reads `{"characters": [...]}` (or a single character object) out of text
/// that may be wrapped in prose, commented, or truncated.
#[derive(Debug, Clone)]
pub struct StructuredStrategy {
    auto_close: bool,
    unknown_name: String,
    unknown_affiliation: String,
}

impl StructuredStrategy {
    /// Build the strategy from parser settings.
    #[must_use]
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            auto_close: config.auto_close_braces,
            unknown_name: config.unknown_name.clone(),
            unknown_affiliation: config.unknown_affiliation.clone(),
        }
    }

    /// Decode the first repair candidate that parses.
    fn decode(&self, text: &str) -> Result<Value, ParseFailure> {
        let text = strip_comments(text);
        let span = object_span(&text);
        let tail = object_tail(&text).ok_or(ParseFailure::NoObject)?;

        let mut candidates: Vec<String> = Vec::with_capacity(3);
        if let Some(span) = span {
            candidates.push(span.to_string());
        }
        if self.auto_close {
            if let Some(span) = span {
                candidates.push(auto_close(span));
            }
            if span != Some(tail) {
                candidates.push(auto_close(tail));
            }
        }

        let mut last_error = String::from("no closing brace");
        for (index, candidate) in candidates.iter().enumerate() {
            match serde_json::from_str::<Value>(&strip_trailing_commas(candidate)) {
                Ok(value) => {
                    if index > 0 {
                        debug!(candidate = index, "Recovered JSON after repair");
                    }
                    return Ok(value);
                }
                Err(err) => last_error = err.to_string(),
            }
        }
        Err(ParseFailure::Decode(last_error))
    }

    fn read_entry(&self, entry: &Value) -> Result<CharacterRecord, String> {
        let Value::Object(fields) = entry else {
            return Err(format!("expected an object, found {}", kind_of(entry)));
        };

        let name = text_field(fields, &["name"])?.unwrap_or_else(|| self.unknown_name.clone());
        let affiliation = text_field(fields, &AFFILIATION_KEYS)?
            .unwrap_or_else(|| self.unknown_affiliation.clone());

        Ok(CharacterRecord {
            name,
            affiliation,
            skills: list_field(fields, &["skills"]),
            memory: memory_field(fields),
            personality_traits: list_field(fields, &TRAIT_KEYS),
            archetype: text_field(fields, &["archetype"]).ok().flatten(),
            role: text_field(fields, &["role"]).ok().flatten(),
            backstory: text_field(fields, &["backstory"]).ok().flatten(),
            beliefs: list_field(fields, &["beliefs"]),
            goals: list_field(fields, &["goals"]),
        })
    }
}

impl ExtractionStrategy for StructuredStrategy {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn extract(&self, text: &str) -> Result<Vec<CharacterRecord>, ParseFailure> {
        let root = self.decode(text)?;

        let entries: Vec<&Value> = match &root {
            Value::Object(fields) => match fields.get("characters") {
                Some(Value::Array(items)) => items.iter().collect(),
                Some(Value::Object(_)) => vec![&fields["characters"]],
                Some(other) => {
                    warn!(found = kind_of(other), "`characters` is not a list");
                    Vec::new()
                }
                None if fields.contains_key("name") => vec![&root],
                None => Vec::new(),
            },
            Value::Array(items) => items.iter().collect(),
            other => {
                warn!(found = kind_of(other), "Decoded value is not an object");
                Vec::new()
            }
        };

        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match self.read_entry(entry) {
                Ok(record) => records.push(record),
                Err(reason) => warn!(index, %reason, "Skipping malformed character entry"),
            }
        }
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn first<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

/// A scalar as trimmed text. Missing or null is `Ok(None)`; lists and
/// objects are an error.
fn text_field(fields: &Map<String, Value>, keys: &[&str]) -> Result<Option<String>, String> {
    match first(fields, keys) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(value @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(value.to_string())),
        Some(other) => Err(format!("`{}` is {}", keys[0], kind_of(other))),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(_) | Value::Bool(_) => value.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// A list of strings. A single string is split on commas; anything else
/// that is not a list yields nothing.
fn list_field(fields: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    match first(fields, keys) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(s)) => split_commas(s),
        _ => Vec::new(),
    }
}

fn memory_field(fields: &Map<String, Value>) -> Vec<MemorySeed> {
    match first(fields, &MEMORY_KEYS) {
        Some(Value::Array(items)) => items.iter().filter_map(memory_seed).collect(),
        Some(Value::String(s)) => split_commas(s).into_iter().map(MemorySeed::from).collect(),
        _ => Vec::new(),
    }
}

fn memory_seed(value: &Value) -> Option<MemorySeed> {
    match value {
        Value::Object(fields) => {
            let content = first(fields, &["content", "text", "memory"]).and_then(scalar_text)?;
            let importance = fields
                .get("importance")
                .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(round_importance)))
                .unwrap_or(1);
            Some(MemorySeed {
                content,
                importance,
                tags: list_field(fields, &["tags"]),
            })
        }
        other => scalar_text(other).map(MemorySeed::from),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round_importance(value: f64) -> i64 {
    // Saturating float-to-int cast; clamped again when the memory is built.
    value.round() as i64
}

fn split_commas(text: &str) -> Vec<String> {
    text.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> StructuredStrategy {
        StructuredStrategy::new(&ParserConfig::default())
    }

    #[test]
    fn reads_characters_list() {
        let text = r#"{"characters": [
            {"name": "Aria", "tribe": "River Folk", "skills": ["fishing"],
             "memory": ["the flood"], "personality_traits": ["curious"]}
        ]}"#;
        let records = strategy().extract(text).expect("decodes");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Aria");
        assert_eq!(records[0].affiliation, "River Folk");
        assert_eq!(records[0].memory, vec![MemorySeed::from("the flood")]);
    }

    #[test]
    fn synonyms_and_string_lists() {
        let text = r#"{"characters": [{"name": "Bren", "group": "Hill Clan",
            "traits": "stubborn, loyal", "memories": [{"content": "the forge", "importance": 7.6, "tags": ["work"]}]}]}"#;
        let records = strategy().extract(text).expect("decodes");
        let bren = &records[0];
        assert_eq!(bren.affiliation, "Hill Clan");
        assert_eq!(bren.personality_traits, vec!["stubborn", "loyal"]);
        assert_eq!(bren.memory[0].importance, 8);
        assert_eq!(bren.memory[0].tags, vec!["work"]);
    }

    #[test]
    fn missing_required_strings_get_defaults() {
        let records = strategy()
            .extract(r#"{"characters": [{"skills": []}]}"#)
            .expect("decodes");
        assert_eq!(records[0].name, "Unknown");
        assert_eq!(records[0].affiliation, "Unknown Group");
        assert!(records[0].personality_traits.is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let text = r#"{"characters": ["just a string", {"name": ["A", "B"]}, {"name": "Cato", "tribe": "Salt"}]}"#;
        let records = strategy().extract(text).expect("decodes");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Cato");
    }

    #[test]
    fn single_object_without_characters_key() {
        let records = strategy()
            .extract(r#"Here: {"name": "Dara", "affiliation": "Salt Traders", "traits": ["shrewd"]}"#)
            .expect("decodes");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Dara");
    }

    #[test]
    fn comments_and_trailing_commas_are_tolerated() {
        let text = r#"{
            "characters": [
                {"name": "Eko", "tribe": "Owls", "personality_traits": ["odd",],}, // first
                /* more later */
            ],
        }"#;
        let records = strategy().extract(text).expect("decodes");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].personality_traits, vec!["odd"]);
    }

    #[test]
    fn truncation_recovers_complete_objects() {
        let text = r#"{"characters": [
            {"name": "Aria", "tribe": "River Folk", "personality_traits": ["curious"]},
            {"name": "Bren", "tribe": "Hill Clan", "personality_traits": ["stubborn"]},
            {"name": "Cato", "tribe": "Salt Tra"#;
        let records = strategy().extract(text).expect("recovers");
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Aria", "Bren"]);
    }

    #[test]
    fn truncation_without_any_closing_brace() {
        let text = r#"{"characters": [{"name": "Aria", "tribe": "River Folk", "personality_traits": ["curious""#;
        let records = strategy().extract(text).expect("recovers");
        assert_eq!(records[0].personality_traits, vec!["curious"]);
    }

    #[test]
    fn auto_close_can_be_disabled() {
        let config = ParserConfig {
            auto_close_braces: false,
            ..ParserConfig::default()
        };
        let text = r#"{"characters": [{"name": "Aria"}"#;
        let failure = StructuredStrategy::new(&config).extract(text).expect_err("truncated");
        assert!(matches!(failure, ParseFailure::Decode(_)));
    }

    #[test]
    fn prose_has_no_object() {
        let failure = strategy().extract("the weather was nice").expect_err("no object");
        assert_eq!(failure, ParseFailure::NoObject);
    }
}
