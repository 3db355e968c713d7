//! Character — identity, personality, memory, emotions, relationships.
//!
//! Construction validates the identity fields and applies the leniency
//! defaults from [`CharacterConfig`]. After construction every numeric field
//! is kept in bounds by the mutators, which clamp instead of rejecting.

use chrono::TimeDelta;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CharacterConfig, PlaceholderConfig};
use crate::emotion::Emotion;
use crate::error::{DramatisError, Result};
use crate::memory::{Memory, MemoryLog, MemorySeed};
use crate::relationship::Relationship;
use crate::types::clamp_unit;

// ---------------------------------------------------------------------------
// Current state
// ---------------------------------------------------------------------------

/// One of the fixed `current_state` gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    /// Physical / narrative stamina.
    Energy,
    /// General disposition, independent of the emotion set.
    Mood,
    /// Wellbeing.
    Health,
}

/// Fixed-key gauges describing how the character is doing, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentState {
    /// Stamina.
    pub energy: f32,
    /// Disposition.
    pub mood: f32,
    /// Wellbeing.
    pub health: f32,
}

impl CurrentState {
    /// Build a state, clamping every gauge.
    #[must_use]
    pub fn new(energy: f32, mood: f32, health: f32) -> Self {
        Self {
            energy: clamp_unit(energy),
            mood: clamp_unit(mood),
            health: clamp_unit(health),
        }
    }

    /// Read one gauge.
    #[must_use]
    pub fn get(&self, field: StateField) -> f32 {
        match field {
            StateField::Energy => self.energy,
            StateField::Mood => self.mood,
            StateField::Health => self.health,
        }
    }

    fn slot(&mut self, field: StateField) -> &mut f32 {
        match field {
            StateField::Energy => &mut self.energy,
            StateField::Mood => &mut self.mood,
            StateField::Health => &mut self.health,
        }
    }
}

impl Default for CurrentState {
    fn default() -> Self {
        Self::new(1.0, 0.5, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Everything needed to build a [`Character`]; optional fields are lenient.
///
/// `tribe` is accepted as a synonym of `affiliation` when deserialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterDraft {
    /// Required, non-blank.
    pub name: String,
    /// Required, non-blank group label.
    #[serde(alias = "tribe")]
    pub affiliation: String,
    /// Required, at least one non-blank trait.
    #[serde(default)]
    pub personality_traits: Vec<String>,
    /// Falls back to the configured default skill when absent or empty.
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    /// Falls back to the configured default memory when absent or empty.
    #[serde(default)]
    pub memory: Option<Vec<MemorySeed>>,
    /// Narrative archetype ("mentor", "trickster", ...).
    #[serde(default)]
    pub archetype: Option<String>,
    /// Role in the story.
    #[serde(default)]
    pub role: Option<String>,
    /// Free-text history.
    #[serde(default)]
    pub backstory: Option<String>,
    /// Things the character holds to be true.
    #[serde(default)]
    pub beliefs: Vec<String>,
    /// Things the character wants.
    #[serde(default)]
    pub goals: Vec<String>,
}

impl CharacterDraft {
    /// Start a draft from the three required fields.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, affiliation: impl Into<String>, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            affiliation: affiliation.into(),
            personality_traits: traits.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the skills.
    #[must_use]
    pub fn skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = Some(skills.into_iter().map(Into::into).collect());
        self
    }

    /// Set the starting memories.
    #[must_use]
    pub fn memories<I, M>(mut self, memories: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MemorySeed>,
    {
        self.memory = Some(memories.into_iter().map(Into::into).collect());
        self
    }

    /// Set the archetype.
    #[must_use]
    pub fn archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }

    /// Set the role.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the backstory.
    #[must_use]
    pub fn backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = Some(backstory.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Character
// ---------------------------------------------------------------------------

/// A simulated persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    name: String,
    #[serde(alias = "tribe")]
    affiliation: String,
    archetype: Option<String>,
    role: Option<String>,
    skills: Vec<String>,
    personality_traits: Vec<String>,
    memory: MemoryLog,
    emotions: IndexMap<String, Emotion>,
    relationships: IndexMap<String, Relationship>,
    beliefs: Vec<String>,
    goals: Vec<String>,
    backstory: String,
    current_state: CurrentState,
}

impl Character {
    /// Build a character from its required fields with default leniency.
    ///
    /// # Errors
    /// Returns `DramatisError::Validation` if `name` or `affiliation` is blank
    /// or `personality_traits` has no non-blank entry.
    pub fn new<I, S>(name: impl Into<String>, affiliation: impl Into<String>, traits: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_draft(CharacterDraft::new(name, affiliation, traits))
    }

    /// Build a character from a draft with default leniency.
    ///
    /// # Errors
    /// See [`Character::new`].
    pub fn from_draft(draft: CharacterDraft) -> Result<Self> {
        Self::from_draft_with(draft, &CharacterConfig::default())
    }

    /// Build a character from a draft, filling gaps from `config`.
    ///
    /// # Errors
    /// See [`Character::new`].
    pub fn from_draft_with(draft: CharacterDraft, config: &CharacterConfig) -> Result<Self> {
        let name = required_text("name", &draft.name)?;
        let affiliation = required_text("affiliation", &draft.affiliation)?;

        let personality_traits = clean_list(draft.personality_traits);
        if personality_traits.is_empty() {
            return Err(DramatisError::validation(
                "personality_traits",
                "at least one personality trait is required",
            ));
        }

        let builtin = CharacterConfig::default();
        let fallback = |configured: &str, builtin: &str| {
            let configured = configured.trim();
            if configured.is_empty() { builtin.to_string() } else { configured.to_string() }
        };

        let mut skills = clean_list(draft.skills.unwrap_or_default());
        if skills.is_empty() {
            skills.push(fallback(&config.default_skill, &builtin.default_skill));
        }

        let mut memory = MemoryLog::new();
        for seed in draft.memory.unwrap_or_default() {
            match seed.into_memory() {
                Ok(entry) => {
                    memory.push(entry);
                }
                Err(err) => debug!(character = %name, %err, "Skipping blank starting memory"),
            }
        }
        if memory.is_empty() {
            memory.push(Memory::from_trimmed(fallback(
                &config.default_memory,
                &builtin.default_memory,
            )));
        }

        Ok(Self {
            name,
            affiliation,
            archetype: optional_text(draft.archetype),
            role: optional_text(draft.role),
            skills,
            personality_traits,
            memory,
            emotions: IndexMap::new(),
            relationships: IndexMap::new(),
            beliefs: clean_list(draft.beliefs),
            goals: clean_list(draft.goals),
            backstory: draft.backstory.map(|b| b.trim().to_string()).unwrap_or_default(),
            current_state: CurrentState::new(
                config.initial_energy,
                config.initial_mood,
                config.initial_health,
            ),
        })
    }

    /// The fallback-of-last-resort character described by `placeholder`.
    ///
    /// Never fails: blank configured values fall back to the built-in
    /// placeholder fields.
    #[must_use]
    pub fn placeholder(placeholder: &PlaceholderConfig, config: &CharacterConfig) -> Self {
        let builtin = PlaceholderConfig::default();
        let text = |value: &str, fallback: &str| {
            let value = value.trim();
            if value.is_empty() { fallback.to_string() } else { value.to_string() }
        };
        let list = |values: &[String], fallback: &[String]| {
            let values = clean_list(values.to_vec());
            if values.is_empty() { clean_list(fallback.to_vec()) } else { values }
        };

        let mut memory = MemoryLog::new();
        for content in list(&placeholder.memory, &builtin.memory) {
            memory.push(Memory::from_trimmed(content));
        }

        Self {
            name: text(&placeholder.name, &builtin.name),
            affiliation: text(&placeholder.affiliation, &builtin.affiliation),
            archetype: None,
            role: None,
            skills: list(&placeholder.skills, &builtin.skills),
            personality_traits: list(&placeholder.personality_traits, &builtin.personality_traits),
            memory,
            emotions: IndexMap::new(),
            relationships: IndexMap::new(),
            beliefs: Vec::new(),
            goals: Vec::new(),
            backstory: String::new(),
            current_state: CurrentState::new(
                config.initial_energy,
                config.initial_mood,
                config.initial_health,
            ),
        }
    }

    // -- Identity ----------------------------------------------------------

    /// Unique name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Group label.
    #[must_use]
    pub fn affiliation(&self) -> &str {
        &self.affiliation
    }

    /// Group label under its older name.
    #[must_use]
    pub fn tribe(&self) -> &str {
        &self.affiliation
    }

    /// Narrative archetype, if known.
    #[must_use]
    pub fn archetype(&self) -> Option<&str> {
        self.archetype.as_deref()
    }

    /// Story role, if known.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Skills, never empty.
    #[must_use]
    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    /// Personality traits, never empty.
    #[must_use]
    pub fn personality_traits(&self) -> &[String] {
        &self.personality_traits
    }

    /// Beliefs.
    #[must_use]
    pub fn beliefs(&self) -> &[String] {
        &self.beliefs
    }

    /// Goals.
    #[must_use]
    pub fn goals(&self) -> &[String] {
        &self.goals
    }

    /// Backstory (possibly empty).
    #[must_use]
    pub fn backstory(&self) -> &str {
        &self.backstory
    }

    // -- Memory ------------------------------------------------------------

    /// The memory log.
    #[must_use]
    pub fn memory(&self) -> &MemoryLog {
        &self.memory
    }

    /// Append a memory stamped now.
    ///
    /// `importance` is clamped into `[1, 10]`.
    ///
    /// # Errors
    /// Returns `DramatisError::Validation` if `content` is blank.
    pub fn add_memory<T, R>(
        &mut self,
        content: impl Into<String>,
        importance: i64,
        tags: T,
        related_characters: R,
    ) -> Result<&Memory>
    where
        T: IntoIterator,
        T::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let memory = Memory::new(content)?
            .with_importance(importance)
            .with_tags(tags)
            .with_related(related_characters);
        Ok(self.push_memory(memory))
    }

    /// Append a plain memory with importance 1.
    ///
    /// # Errors
    /// Returns `DramatisError::Validation` if `content` is blank.
    pub fn remember(&mut self, content: impl Into<String>) -> Result<&Memory> {
        let memory = Memory::new(content)?;
        Ok(self.push_memory(memory))
    }

    /// Append an already-built memory.
    pub fn push_memory(&mut self, memory: Memory) -> &Memory {
        debug!(character = %self.name, importance = memory.importance, "Memory added");
        self.memory.push(memory)
    }

    /// The `n` most recent memories, newest first.
    #[must_use]
    pub fn recent_memories(&self, n: usize) -> Vec<&Memory> {
        self.memory.recent(n)
    }

    /// Memories at or above `min_importance`, in insertion order.
    #[must_use]
    pub fn important_memories(&self, min_importance: u8) -> Vec<&Memory> {
        self.memory.important(min_importance)
    }

    /// Search memories by substring, tags and age.
    #[must_use]
    pub fn search_memories(
        &self,
        query: &str,
        tags: Option<&[String]>,
        timeframe: Option<TimeDelta>,
    ) -> Vec<&Memory> {
        self.memory.search(query, tags, timeframe)
    }

    /// Summarize the top five memories, optionally about `topic`.
    #[must_use]
    pub fn summarize_memories(&self, topic: Option<&str>) -> String {
        self.summarize_memories_with(topic, 5)
    }

    /// Summarize the top `limit` memories, optionally about `topic`.
    #[must_use]
    pub fn summarize_memories_with(&self, topic: Option<&str>, limit: usize) -> String {
        self.memory.summarize(&self.name, topic, limit)
    }

    // -- Emotions ----------------------------------------------------------

    /// Emotions keyed by lowercase name, in first-recorded order.
    #[must_use]
    pub fn emotions(&self) -> &IndexMap<String, Emotion> {
        &self.emotions
    }

    /// Current intensity of an emotion, if it has been recorded.
    #[must_use]
    pub fn emotion(&self, name: &str) -> Option<f32> {
        self.emotions
            .get(&normalize_emotion(name))
            .map(|emotion| emotion.intensity)
    }

    /// Set an emotion's intensity (clamped), recording it if new.
    ///
    /// Returns the stored intensity, or `None` for a blank name.
    pub fn update_emotion(&mut self, name: &str, intensity: f32) -> Option<f32> {
        let key = normalize_emotion(name);
        if key.is_empty() {
            return None;
        }
        let entry = self
            .emotions
            .entry(key.clone())
            .or_insert_with(|| Emotion::new(key, 0.0));
        entry.set_intensity(intensity);
        Some(entry.intensity)
    }

    // -- Relationships -----------------------------------------------------

    /// Relationships keyed by the other character's name, in first-met order.
    #[must_use]
    pub fn relationships(&self) -> &IndexMap<String, Relationship> {
        &self.relationships
    }

    /// This character's view of `other`, if any.
    #[must_use]
    pub fn relationship(&self, other: &str) -> Option<&Relationship> {
        self.relationships.get(other.trim())
    }

    /// Shift trust and friendship toward `other`, creating the record at
    /// 0.5 / 0.5 first if needed. Results are clamped to `[0, 1]`.
    pub fn update_relationship(
        &mut self,
        other: &str,
        trust_delta: f32,
        friendship_delta: f32,
    ) -> &Relationship {
        let relationship = self.relationship_entry(other);
        relationship.adjust(trust_delta, friendship_delta);
        relationship
    }

    /// Append an event description to the relationship with `other`.
    pub fn record_history(&mut self, other: &str, event: impl Into<String>) {
        self.relationship_entry(other).history.push(event.into());
    }

    fn relationship_entry(&mut self, other: &str) -> &mut Relationship {
        let key = other.trim().to_string();
        self.relationships
            .entry(key.clone())
            .or_insert_with(|| Relationship::new(key))
    }

    // -- Beliefs, goals, backstory ----------------------------------------

    /// Add a belief. Blank or duplicate beliefs are ignored.
    pub fn add_belief(&mut self, belief: impl Into<String>) {
        push_unique(&mut self.beliefs, belief.into());
    }

    /// Add a goal. Blank or duplicate goals are ignored.
    pub fn add_goal(&mut self, goal: impl Into<String>) {
        push_unique(&mut self.goals, goal.into());
    }

    /// Replace the backstory.
    pub fn set_backstory(&mut self, backstory: impl Into<String>) {
        self.backstory = backstory.into().trim().to_string();
    }

    // -- Current state -----------------------------------------------------

    /// The `energy` / `mood` / `health` gauges.
    #[must_use]
    pub fn current_state(&self) -> &CurrentState {
        &self.current_state
    }

    /// Shift one gauge by `delta`, clamped to `[0, 1]`. Returns the new value.
    pub fn adjust_state(&mut self, field: StateField, delta: f32) -> f32 {
        let slot = self.current_state.slot(field);
        if delta.is_finite() {
            *slot = clamp_unit(*slot + delta);
        }
        *slot
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Canonical emotion key: trimmed, lowercase.
pub(crate) fn normalize_emotion(name: &str) -> String {
    name.trim().to_lowercase()
}

fn required_text(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DramatisError::validation(field, format!("{field} must not be empty")))
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn push_unique(list: &mut Vec<String>, item: String) {
    let item = item.trim();
    if !item.is_empty() && !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}
