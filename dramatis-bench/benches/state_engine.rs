//! Dramatis Benchmark Suite
//!
//! Hot paths per story turn:
//!   parse_structured_three ........ clean cast reply
//!   parse_truncated_three ......... reply cut off mid-object
//!   parse_labeled_three ........... labeled-prose reply
//!   process_event_four_emotions ... one event with opposing pairs
//!   summarize_top5_from_200 ....... memory summary for a prompt
//!   recent_10_from_200 ............ recency view
//!   search_from_200 ............... substring + tag search
//!   interaction_cooperation ....... symmetric relationship update

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dramatis_core::{Cast, Character, InteractionKind, process_event};
use dramatis_llm::CharacterParser;

const STRUCTURED: &str = r#"{"characters": [
    {"name": "Aria", "tribe": "River Folk", "skills": ["fishing", "swimming"], "memory": ["the flood"], "personality_traits": ["curious", "brave"]},
    {"name": "Bren", "tribe": "Hill Clan", "skills": ["smithing"], "memory": ["the forge"], "personality_traits": ["stubborn"]},
    {"name": "Cato", "tribe": "Salt Traders", "skills": ["haggling"], "memory": ["a storm at sea"], "personality_traits": ["shrewd"]}
]}"#;

const LABELED: &str = "Character 1:\nName: Aria\nTribe: River Folk\nSkills: fishing, swimming\nPersonality Traits: curious, brave\n\n\
Character 2:\nName: Bren\nTribe: Hill Clan\nSkills: smithing\nPersonality Traits: stubborn\n\n\
Character 3:\nName: Cato\nTribe: Salt Traders\nSkills: haggling\nPersonality Traits: shrewd";

fn make_character(memories: u32) -> Character {
    let mut character =
        Character::new("Aria", "River Folk", ["curious", "brave"]).expect("valid character");
    for i in 0..memories {
        let tag = if i % 3 == 0 { "river" } else { "village" };
        character
            .add_memory(
                format!("Event number {i} happened by the {tag}"),
                i64::from(i % 10) + 1,
                [tag],
                ["Bren"],
            )
            .expect("valid memory");
    }
    character
}

fn bench_parser(c: &mut Criterion) {
    let parser = CharacterParser::new();
    let truncated = &STRUCTURED[..STRUCTURED.len() - 40];

    c.bench_function("parse_structured_three", |b| {
        b.iter(|| black_box(parser.parse(black_box(STRUCTURED))));
    });
    c.bench_function("parse_truncated_three", |b| {
        b.iter(|| black_box(parser.parse(black_box(truncated))));
    });
    c.bench_function("parse_labeled_three", |b| {
        b.iter(|| black_box(parser.parse(black_box(LABELED))));
    });
}

fn bench_process_event(c: &mut Criterion) {
    let mut character = make_character(0);
    let changes = [("joy", 0.2), ("sadness", -0.1), ("anger", 0.3), ("fear", 0.1)];

    c.bench_function("process_event_four_emotions", |b| {
        b.iter(|| {
            process_event(
                black_box(&mut character),
                black_box("a sudden storm"),
                black_box(changes),
            );
        });
    });
}

fn bench_memory_views(c: &mut Criterion) {
    let character = make_character(200);
    let tags = vec!["river".to_string()];

    c.bench_function("summarize_top5_from_200", |b| {
        b.iter(|| black_box(character.summarize_memories(black_box(None))));
    });
    c.bench_function("recent_10_from_200", |b| {
        b.iter(|| black_box(character.recent_memories(black_box(10))));
    });
    c.bench_function("search_from_200", |b| {
        b.iter(|| {
            black_box(character.search_memories(black_box("event"), Some(tags.as_slice()), None))
        });
    });
}

fn bench_interaction(c: &mut Criterion) {
    let mut cast = Cast::new();
    for name in ["Aria", "Bren"] {
        cast.insert(Character::new(name, "River Folk", ["calm"]).expect("valid character"))
            .expect("unique name");
    }

    c.bench_function("interaction_cooperation", |b| {
        b.iter(|| {
            black_box(
                cast.interact(
                    black_box("Aria"),
                    black_box("Bren"),
                    InteractionKind::Cooperation,
                    black_box(0.5),
                )
                .expect("both present"),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_parser,
    bench_process_event,
    bench_memory_views,
    bench_interaction,
);
criterion_main!(benches);
