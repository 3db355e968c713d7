//! Prompt templates and the read-side character context used to build them.
//!
//! Templates use `{key}` placeholders and are filled with
//! [`render_template`]. Literal braces in the JSON examples are safe as long
//! as they never enclose a bare placeholder name.

use dramatis_core::Character;
use dramatis_core::config::{LlmConfig, MemoryConfig};
use dramatis_core::emotion::{dominant_emotion, mood};
use dramatis_core::relationship::relationship_summary;

use crate::types::LlmRequest;

/// System prompt for creating the opening cast.
pub const CAST_CREATION_SYSTEM: &str = r#"You are the World agent responsible for creating an engaging story setting and characters based on the topic: {topic}.
Create 2-4 characters that would make an interesting conversation/story.

You must return your response in the following JSON format:
{
    "characters": [
        {
            "name": "Character Name",
            "tribe": "Character's Group/Affiliation",
            "skills": ["Skill 1", "Skill 2", "Skill 3"],
            "memory": ["Memory 1", "Memory 2"],
            "personality_traits": ["Trait 1", "Trait 2"],
            "archetype": "optional archetype",
            "role": "optional role in the story"
        }
    ]
}

IMPORTANT: Respond ONLY with the JSON. Do not add any additional text before or after the JSON."#;

/// User prompt for creating the opening cast.
pub const CAST_CREATION_USER: &str = "Create characters for a story about: {topic}. Remember to respond ONLY with the JSON format specified.";

/// Persona instructions for one character.
pub const CHARACTER_PERSONA: &str = "You are {name} from the {affiliation} tribe. You are {traits}. Respond in character and keep conversations going naturally.";

/// System prompt for the narrator.
pub const WORLD_NARRATOR: &str = r"You are the World agent - essentially the narrator and god-like entity of this story.
You can:
1. Describe scenes and settings
2. Introduce new characters when appropriate
3. Create events or situations that add drama or interest
4. Describe environmental changes or consequences of actions

Keep your interventions natural and relevant to the ongoing story. Don't overshadow the character interactions.
When introducing new characters, describe them in the same JSON format used for the opening cast.";

/// Opening scene request to the narrator.
pub const SCENE_SETTING_USER: &str = "Set the scene for our story about {topic}. Describe the setting and atmosphere.";

/// Periodic nudge asking the narrator whether to intervene.
pub const WORLD_INTERVENTION_USER: &str = "Consider if you should: introduce a new character, create an event, describe environment changes, or add dramatic elements to the story. Make your intervention natural and relevant to the current situation.";

/// Turn instruction for a character.
pub const CONTINUE_CONVERSATION_USER: &str = "Continue the conversation naturally, reacting to recent events and other characters.";

/// Closing request to the narrator.
pub const CONCLUSION_USER: &str = "Provide a fitting conclusion to the story.";

/// Render a template by replacing `{key}` placeholders with values.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}

/// The request that asks the generator for an opening cast about `topic`,
/// with sampling settings and timeout from `config`.
#[must_use]
pub fn cast_creation_request(topic: &str, config: &LlmConfig) -> LlmRequest {
    let vars = [("topic", topic)];
    LlmRequest::new(
        render_template(CAST_CREATION_SYSTEM, &vars),
        render_template(CAST_CREATION_USER, &vars),
    )
    .with_config(config)
}

/// Persona instructions for `character`.
#[must_use]
pub fn persona_instructions(character: &Character) -> String {
    let traits = character.personality_traits().join(", ");
    render_template(
        CHARACTER_PERSONA,
        &[
            ("name", character.name()),
            ("affiliation", character.affiliation()),
            ("traits", traits.as_str()),
        ],
    )
}

/// Everything orchestration needs to prompt `character` for its next turn:
/// persona, role, skills, memory summary, dominant emotion, mood, and how it
/// regards each of `others`.
#[must_use]
pub fn character_context(character: &Character, others: &[&str]) -> String {
    character_context_with(character, others, &MemoryConfig::default())
}

/// [`character_context`] with the memory summary sized by `memory`.
#[must_use]
pub fn character_context_with(
    character: &Character,
    others: &[&str],
    memory: &MemoryConfig,
) -> String {
    let mut lines = vec![persona_instructions(character)];

    if let Some(role) = character.role() {
        lines.push(format!("Your role: {role}."));
    }
    if let Some(archetype) = character.archetype() {
        lines.push(format!("Your archetype: {archetype}."));
    }
    lines.push(format!("Your skills: {}.", character.skills().join(", ")));
    if !character.backstory().is_empty() {
        lines.push(format!("Your backstory: {}", character.backstory()));
    }
    if !character.goals().is_empty() {
        lines.push(format!("Your goals: {}.", character.goals().join("; ")));
    }

    let summary = character.summarize_memories_with(None, memory.summary_limit);
    lines.push(summary.trim_end().to_string());

    let feeling = dominant_emotion(character).unwrap_or("nothing in particular");
    lines.push(format!(
        "You currently feel {feeling} (mood {:.2}).",
        mood(character)
    ));

    for other in others.iter().filter(|other| **other != character.name()) {
        lines.push(relationship_summary(character, other));
    }

    lines.join("\n")
}
