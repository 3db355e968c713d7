//! Memory — timestamped, importance-weighted facts a character remembers.
//!
//! A [`MemoryLog`] is append-only: memories are never edited or evicted.
//! Every query in [`query`] returns a derived view and leaves the log's
//! insertion order untouched.

pub mod query;

use serde::{Deserialize, Serialize};

use crate::error::{DramatisError, Result};
use crate::types::{MemoryId, Timestamp, clamp_importance};

/// A single remembered fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Unique identifier.
    pub id: MemoryId,
    /// What is remembered. Never blank.
    pub content: String,
    /// When the memory was formed.
    pub timestamp: Timestamp,
    /// Significance in `[1, 10]`.
    pub importance: u8,
    /// Free-form labels; order carries no meaning.
    pub tags: Vec<String>,
    /// Names of the characters this memory involves.
    pub related_characters: Vec<String>,
}

impl Memory {
    /// Create a memory stamped with the current instant and importance 1.
    ///
    /// # Errors
    /// Returns `DramatisError::Validation` if `content` is blank.
    pub fn new(content: impl Into<String>) -> Result<Self> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(DramatisError::validation(
                "content",
                "memory content must not be empty",
            ));
        }
        Ok(Self::from_trimmed(trimmed.to_string()))
    }

    /// Build from content the caller has already trimmed and checked.
    pub(crate) fn from_trimmed(content: String) -> Self {
        Self {
            id: MemoryId::new(),
            content,
            timestamp: Timestamp::now(),
            importance: 1,
            tags: Vec::new(),
            related_characters: Vec::new(),
        }
    }

    /// Set the importance, clamped into `[1, 10]`.
    #[must_use]
    pub fn with_importance(mut self, importance: i64) -> Self {
        self.importance = clamp_importance(importance);
        self
    }

    /// Set the tags. Duplicates and blank tags are dropped.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.clear();
        for tag in tags {
            let tag = tag.into().trim().to_string();
            if !tag.is_empty() && !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        self
    }

    /// Set the related character names.
    #[must_use]
    pub fn with_related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_characters = related.into_iter().map(Into::into).collect();
        self
    }

    /// Override the creation instant.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Whether this memory carries at least one of `tags`.
    #[must_use]
    pub fn shares_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| self.tags.contains(tag))
    }
}

/// Construction-time description of a memory: plain text plus optional weight.
///
/// Plain strings convert into seeds with importance 1 and no tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySeed {
    /// What is remembered.
    pub content: String,
    /// Requested importance; clamped on conversion.
    #[serde(default = "default_importance")]
    pub importance: i64,
    /// Labels.
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_importance() -> i64 {
    1
}

impl MemorySeed {
    /// Turn the seed into a stamped memory.
    ///
    /// # Errors
    /// Returns `DramatisError::Validation` if the content is blank.
    pub fn into_memory(self) -> Result<Memory> {
        Ok(Memory::new(self.content)?
            .with_importance(self.importance)
            .with_tags(self.tags))
    }
}

impl From<&str> for MemorySeed {
    fn from(content: &str) -> Self {
        Self::from(content.to_string())
    }
}

impl From<String> for MemorySeed {
    fn from(content: String) -> Self {
        Self {
            content,
            importance: 1,
            tags: Vec::new(),
        }
    }
}

/// A character's ordered, append-only memory store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryLog {
    entries: Vec<Memory>,
}

impl MemoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a memory, returning a reference to the stored entry.
    pub fn push(&mut self, memory: Memory) -> &Memory {
        let index = self.entries.len();
        self.entries.push(memory);
        &self.entries[index]
    }

    /// Number of memories held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no memories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Memories in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Memory> {
        self.entries.iter()
    }

    /// Memories in insertion order, as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Memory] {
        &self.entries
    }

    /// Look a memory up by id.
    #[must_use]
    pub fn get(&self, id: MemoryId) -> Option<&Memory> {
        self.entries.iter().find(|memory| memory.id == id)
    }
}

impl<'a> IntoIterator for &'a MemoryLog {
    type Item = &'a Memory;
    type IntoIter = std::slice::Iter<'a, Memory>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
