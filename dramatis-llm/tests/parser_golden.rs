//! Character ingestion — golden reply set.
//!
//! Each case is a reply shape seen from small local models, paired with
//! the cast it must produce. Cases run fully offline.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use dramatis_core::{Character, DramatisConfig};
use dramatis_llm::{
    CharacterParser, LlmError, LlmRequest, LlmResponse, TextGenerator, generate_cast,
    parse_characters,
};
use proptest::prelude::*;

/// A golden parse case.
struct GoldenCase {
    /// Human-readable name for the test case.
    name: &'static str,
    /// Raw generator reply.
    reply: &'static str,
    /// Names the parse must yield, in order.
    names: Vec<&'static str>,
    /// Strategy expected to have produced the records.
    strategy: Option<&'static str>,
}

fn golden_cases() -> Vec<GoldenCase> {
    vec![
        // ---------------------------------------------------------------
        // 1. Well-formed reply in the requested format
        // ---------------------------------------------------------------
        GoldenCase {
            name: "clean_three_character_json",
            reply: THREE_CHARACTERS,
            names: vec!["Aria", "Bren", "Cato"],
            strategy: Some("structured"),
        },
        // ---------------------------------------------------------------
        // 2. Reply wrapped in a fenced code block with chatter around it
        // ---------------------------------------------------------------
        GoldenCase {
            name: "fenced_json_with_chatter",
            reply: "Sure! Here is the cast:\n```json\n{\"characters\": [{\"name\": \"Dara\", \"tribe\": \"Salt Traders\", \"personality_traits\": [\"shrewd\"]}]}\n```\nEnjoy!",
            names: vec!["Dara"],
            strategy: Some("structured"),
        },
        // ---------------------------------------------------------------
        // 3. Reply cut off by the token limit mid-object
        // ---------------------------------------------------------------
        GoldenCase {
            name: "truncated_json",
            reply: "{\"characters\": [\n  {\"name\": \"Aria\", \"tribe\": \"River Folk\", \"personality_traits\": [\"curious\"]},\n  {\"name\": \"Bren\", \"tribe\": \"Hill Clan\", \"personality_traits\": [\"stubborn\"]},\n  {\"name\": \"Cato\", \"tri",
            names: vec!["Aria", "Bren"],
            strategy: Some("structured"),
        },
        // ---------------------------------------------------------------
        // 4. Model ignored the format and wrote labeled prose
        // ---------------------------------------------------------------
        GoldenCase {
            name: "labeled_prose",
            reply: "Character 1:\nName: Aria\nTribe: River Folk\nSkills: fishing, swimming\nPersonality Traits: curious, brave\n\nCharacter 2:\nName: Bren\nTribe: Hill Clan\nPersonality Traits: stubborn",
            names: vec!["Aria", "Bren"],
            strategy: Some("labeled"),
        },
        // ---------------------------------------------------------------
        // 5. Labeled prose that ends with a stray closing fence
        // ---------------------------------------------------------------
        GoldenCase {
            name: "labeled_with_trailing_fence",
            reply: "Name: Aria\nTribe: River Folk\nTraits: calm\n\nName: Bren\nTribe: Hill Clan\nTraits: loud\n```",
            names: vec!["Aria", "Bren"],
            strategy: Some("labeled"),
        },
        // ---------------------------------------------------------------
        // 6. One character per fenced block
        // ---------------------------------------------------------------
        GoldenCase {
            name: "two_fenced_blocks",
            reply: "First:\n```\nName: Aria\nTribe: River Folk\nTraits: calm\n```\nSecond:\n```\nName: Bren\nTribe: Hill Clan\nTraits: loud\n```",
            names: vec!["Aria", "Bren"],
            strategy: Some("labeled"),
        },
        // ---------------------------------------------------------------
        // 7. Nothing usable at all
        // ---------------------------------------------------------------
        GoldenCase {
            name: "plain_prose",
            reply: "the weather was nice",
            names: vec!["Default Character"],
            strategy: None,
        },
        // ---------------------------------------------------------------
        // 8. Decodes, but every record is missing its traits
        // ---------------------------------------------------------------
        GoldenCase {
            name: "all_records_invalid",
            reply: r#"{"characters": [{"name": "Eko", "tribe": "Owls"}]}"#,
            names: vec!["Default Character"],
            strategy: Some("structured"),
        },
    ]
}

const THREE_CHARACTERS: &str = r#"{
    "characters": [
        {
            "name": "Aria",
            "tribe": "River Folk",
            "skills": ["fishing", "swimming"],
            "memory": ["the great flood", "her first catch"],
            "personality_traits": ["curious", "brave"],
            "archetype": "explorer",
            "role": "scout"
        },
        {
            "name": "Bren",
            "tribe": "Hill Clan",
            "skills": [],
            "memory": [],
            "personality_traits": ["stubborn"]
        },
        {
            "name": "Cato",
            "tribe": "Salt Traders",
            "skills": ["haggling"],
            "memory": [{"content": "a storm at sea", "importance": 9, "tags": ["sea"]}],
            "personality_traits": ["shrewd", "patient"]
        }
    ]
}"#;

#[test]
fn golden_cases_parse_as_expected() {
    let parser = CharacterParser::new();
    for case in golden_cases() {
        let report = parser.parse_report(case.reply);
        let names: Vec<&str> = report.characters.iter().map(Character::name).collect();
        assert_eq!(names, case.names, "case `{}`: names", case.name);
        assert_eq!(report.strategy, case.strategy, "case `{}`: strategy", case.name);
    }
}

#[test]
fn clean_json_keeps_every_field() {
    let cast = parse_characters(THREE_CHARACTERS);
    assert_eq!(cast.len(), 3);

    let aria = &cast[0];
    assert_eq!(aria.affiliation(), "River Folk");
    assert_eq!(aria.skills(), ["fishing", "swimming"]);
    assert_eq!(aria.personality_traits(), ["curious", "brave"]);
    assert_eq!(aria.archetype(), Some("explorer"));
    assert_eq!(aria.role(), Some("scout"));
    let contents: Vec<&str> = aria.memory().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["the great flood", "her first catch"]);

    // Empty lists fall back to the configured defaults.
    let bren = &cast[1];
    assert_eq!(bren.skills(), ["Adaptability"]);
    assert_eq!(bren.memory().len(), 1);
    assert_eq!(bren.archetype(), None);

    let cato = &cast[2];
    let storm = cato.memory().iter().next().expect("memory");
    assert_eq!(storm.content, "a storm at sea");
    assert_eq!(storm.importance, 9);
    assert_eq!(storm.tags, ["sea"]);
}

#[test]
fn placeholder_follows_config() {
    let config = DramatisConfig::from_toml(
        r#"
        [parser.placeholder]
        name = "The Stranger"
        affiliation = "Nowhere"
        "#,
    )
    .expect("valid toml");
    let cast = CharacterParser::from_config(&config).parse("no characters here");
    assert_eq!(cast.len(), 1);
    assert_eq!(cast[0].name(), "The Stranger");
    assert_eq!(cast[0].affiliation(), "Nowhere");
}

#[test]
fn blank_character_defaults_do_not_drop_records() {
    let config = DramatisConfig::from_toml(
        r#"
        [character]
        default_skill = ""
        default_memory = "   "
        "#,
    )
    .expect("valid toml");
    let report = CharacterParser::from_config(&config)
        .parse_report(r#"{"characters": [{"name": "Aria", "tribe": "River Folk", "traits": ["calm"]}]}"#);
    assert!(!report.placeholder);
    assert_eq!(report.characters[0].name(), "Aria");
    assert_eq!(report.characters[0].skills(), ["Adaptability"]);
    assert_eq!(report.characters[0].memory().len(), 1);
}

#[test]
fn parsed_characters_start_with_configured_state() {
    let config = DramatisConfig::from_toml(
        r"
        [character]
        initial_energy = 0.25
        ",
    )
    .expect("valid toml");
    let cast = CharacterParser::from_config(&config).parse(THREE_CHARACTERS);
    assert!(cast.iter().all(|c| (c.current_state().energy - 0.25).abs() < f32::EPSILON));
}

// ---------------------------------------------------------------------------
// Cast generation against a scripted generator
// ---------------------------------------------------------------------------

struct Script {
    replies: Mutex<Vec<Result<&'static str, &'static str>>>,
    calls: AtomicUsize,
}

impl Script {
    fn new(mut replies: Vec<Result<&'static str, &'static str>>) -> Self {
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            calls: AtomicUsize::new(0),
        }
    }
}

impl TextGenerator for Script {
    async fn generate(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.lock().expect("lock").pop() {
            Some(Ok(text)) => Ok(LlmResponse::from_text(text)),
            Some(Err(reason)) => Err(LlmError::RequestFailed(reason.to_string())),
            None => Err(LlmError::Unavailable("script exhausted".into())),
        }
    }
}

#[tokio::test]
async fn generate_cast_retries_past_a_useless_reply() {
    let script = Script::new(vec![Ok("I'd love to help with that story!"), Ok(THREE_CHARACTERS)]);
    let cast = generate_cast(&script, &CharacterParser::new(), "a river delta", 3)
        .await
        .expect("cast");
    assert_eq!(cast.len(), 3);
    assert_eq!(script.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn generate_cast_surfaces_repeated_transport_failures() {
    let script = Script::new(vec![Err("connection refused"); 3]);
    let err = generate_cast(&script, &CharacterParser::new(), "a river delta", 3)
        .await
        .expect_err("all attempts failed");
    assert!(matches!(err, LlmError::RetriesExhausted { attempts: 3, .. }));
    assert_eq!(script.calls.load(Ordering::SeqCst), 3);
}

proptest! {
    #[test]
    fn parse_never_returns_an_empty_batch(text in ".{0,400}") {
        let cast = parse_characters(&text);
        prop_assert!(!cast.is_empty());
        for character in &cast {
            prop_assert!(!character.name().trim().is_empty());
            prop_assert!(!character.personality_traits().is_empty());
        }
    }

    #[test]
    fn truncating_a_good_reply_never_panics(cut in 0usize..600) {
        let end = THREE_CHARACTERS
            .char_indices()
            .map(|(i, _)| i)
            .find(|&i| i >= cut)
            .unwrap_or(THREE_CHARACTERS.len());
        let cast = parse_characters(&THREE_CHARACTERS[..end]);
        prop_assert!(!cast.is_empty());
    }
}
