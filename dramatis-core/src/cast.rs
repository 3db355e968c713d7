//! Cast — the ordered roster of characters taking part in a story.
//!
//! Characters are keyed by their (unique) name and kept in insertion order,
//! which is the order the orchestration layer gives them turns in.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::character::Character;
use crate::emotion;
use crate::error::{DramatisError, Result};
use crate::relationship::{self, InteractionKind};

/// An ordered set of characters with unique names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cast {
    members: Vec<Character>,
}

impl Cast {
    /// An empty cast.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a character.
    ///
    /// # Errors
    /// Returns `DramatisError::DuplicateCharacter` if the name is taken.
    pub fn insert(&mut self, character: Character) -> Result<()> {
        if self.position(character.name()).is_some() {
            return Err(DramatisError::DuplicateCharacter(character.name().to_string()));
        }
        debug!(character = %character.name(), "Character joined the cast");
        self.members.push(character);
        Ok(())
    }

    /// Add every character from a parsed batch, skipping names already
    /// present. Returns how many were added.
    pub fn extend_from_parse<I>(&mut self, characters: I) -> usize
    where
        I: IntoIterator<Item = Character>,
    {
        let mut added = 0;
        for character in characters {
            let name = character.name().to_string();
            match self.insert(character) {
                Ok(()) => added += 1,
                Err(err) => warn!(character = %name, %err, "Skipping parsed character"),
            }
        }
        added
    }

    /// Look a character up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Character> {
        self.position(name).map(|index| &self.members[index])
    }

    /// Look a character up by name, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Character> {
        self.position(name).map(|index| &mut self.members[index])
    }

    /// Member names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(Character::name)
    }

    /// Members in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Character> {
        self.members.iter()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the cast is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Apply an interaction between two members.
    ///
    /// Returns whether the interaction changed anything (a non-finite
    /// intensity is ignored).
    ///
    /// # Errors
    /// Returns `DramatisError::SelfInteraction` if `a` and `b` name the same
    /// character, or `DramatisError::CharacterNotFound` for an unknown name.
    pub fn interact(
        &mut self,
        a: &str,
        b: &str,
        kind: InteractionKind,
        intensity: f32,
    ) -> Result<bool> {
        let (first, second) = self.pair_mut(a, b)?;
        Ok(relationship::apply_interaction(first, second, kind, intensity))
    }

    /// Apply an interaction named by a free-form label.
    ///
    /// Unknown labels are ignored and return `Ok(None)`.
    ///
    /// # Errors
    /// See [`Cast::interact`].
    pub fn interact_named(
        &mut self,
        a: &str,
        b: &str,
        interaction_type: &str,
        intensity: f32,
    ) -> Result<Option<InteractionKind>> {
        let (first, second) = self.pair_mut(a, b)?;
        Ok(relationship::process_interaction(
            first,
            second,
            interaction_type,
            intensity,
        ))
    }

    /// Feed an event's emotion deltas to one member.
    ///
    /// # Errors
    /// Returns `DramatisError::CharacterNotFound` for an unknown name.
    pub fn process_event<I, K>(&mut self, name: &str, event: &str, emotion_changes: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, f32)>,
        K: AsRef<str>,
    {
        let character = self
            .get_mut(name)
            .ok_or_else(|| DramatisError::CharacterNotFound(name.to_string()))?;
        emotion::process_event(character, event, emotion_changes);
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.members.iter().position(|c| c.name() == name)
    }

    fn pair_mut(&mut self, a: &str, b: &str) -> Result<(&mut Character, &mut Character)> {
        let i = self
            .position(a)
            .ok_or_else(|| DramatisError::CharacterNotFound(a.to_string()))?;
        let j = self
            .position(b)
            .ok_or_else(|| DramatisError::CharacterNotFound(b.to_string()))?;
        if i == j {
            return Err(DramatisError::SelfInteraction(a.to_string()));
        }

        if i < j {
            let (head, tail) = self.members.split_at_mut(j);
            Ok((&mut head[i], &mut tail[0]))
        } else {
            let (head, tail) = self.members.split_at_mut(i);
            Ok((&mut tail[0], &mut head[j]))
        }
    }
}

impl<'a> IntoIterator for &'a Cast {
    type Item = &'a Character;
    type IntoIter = std::slice::Iter<'a, Character>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl IntoIterator for Cast {
    type Item = Character;
    type IntoIter = std::vec::IntoIter<Character>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}
