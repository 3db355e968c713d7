//! Read-only memory views: recency, importance, search, summaries.
//!
//! Sorting always uses stable sorts over references, so memories that
//! compare equal keep their insertion order and the log is never reordered.

use std::fmt::Write as _;

use chrono::{DateTime, TimeDelta, Utc};

use super::{Memory, MemoryLog};

impl MemoryLog {
    /// The `n` most recent memories, newest first.
    ///
    /// Memories with identical timestamps keep their insertion order.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<&Memory> {
        let mut view: Vec<&Memory> = self.iter().collect();
        view.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        view.truncate(n);
        view
    }

    /// All memories with `importance >= min_importance`, in insertion order.
    #[must_use]
    pub fn important(&self, min_importance: u8) -> Vec<&Memory> {
        self.iter()
            .filter(|memory| memory.importance >= min_importance)
            .collect()
    }

    /// Case-insensitive substring search, optionally narrowed by tags and age.
    ///
    /// `tags`: the memory must carry at least one of them (an empty slice
    /// filters nothing). `timeframe`: the memory must be no older than this.
    /// All filters are combined with AND.
    #[must_use]
    pub fn search(
        &self,
        query: &str,
        tags: Option<&[String]>,
        timeframe: Option<TimeDelta>,
    ) -> Vec<&Memory> {
        self.search_at(query, tags, timeframe, Utc::now())
    }

    /// [`MemoryLog::search`] evaluated against an explicit "now".
    #[must_use]
    pub fn search_at(
        &self,
        query: &str,
        tags: Option<&[String]>,
        timeframe: Option<TimeDelta>,
        now: DateTime<Utc>,
    ) -> Vec<&Memory> {
        let needle = query.to_lowercase();
        self.iter()
            .filter(|memory| memory.content.to_lowercase().contains(&needle))
            .filter(|memory| match tags {
                Some(tags) if !tags.is_empty() => memory.shares_tag(tags),
                _ => true,
            })
            .filter(|memory| match timeframe {
                Some(window) => memory.timestamp.age_at(now) <= window,
                None => true,
            })
            .collect()
    }

    /// Render the top `limit` memories as a bulleted block.
    ///
    /// With a `topic`, only memories whose content contains it
    /// (case-insensitively) are considered. Ranking is by importance, then
    /// recency, both descending.
    #[must_use]
    pub fn summarize(&self, owner: &str, topic: Option<&str>, limit: usize) -> String {
        let mut view: Vec<&Memory> = match topic {
            Some(topic) => {
                let needle = topic.to_lowercase();
                self.iter()
                    .filter(|memory| memory.content.to_lowercase().contains(&needle))
                    .collect()
            }
            None => self.iter().collect(),
        };

        if view.is_empty() {
            return format!("{owner} has no relevant memories.");
        }

        view.sort_by(|a, b| {
            b.importance
                .cmp(&a.importance)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });

        let mut summary = format!("{owner}'s key memories:\n");
        for memory in view.into_iter().take(limit) {
            let _ = writeln!(
                summary,
                "- {} (Importance: {})",
                memory.content, memory.importance
            );
        }
        summary
    }
}
