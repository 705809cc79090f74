// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The history collaborator.
//!
//! The editor only calls [`HistoryStore`]. Persistence and the storage format are up
//! to the host. [`InMemoryHistory`] is the default: a bounded list with a recall
//! cursor that walks from the newest line towards the oldest and back.

use std::collections::VecDeque;

/// Default number of lines kept by [`InMemoryHistory`].
pub const HISTORY_SIZE_MAX: usize = 500;

/// See the module docs.
pub trait HistoryStore: std::fmt::Debug {
    /// Archives a completed line and resets the recall cursor.
    fn append(&mut self, line: &str);

    /// Moves the recall cursor one step towards older lines and returns the first one
    /// that starts with `prefix`. `None` leaves the cursor where it was.
    fn recall_previous(&mut self, prefix: &str) -> Option<String>;

    /// Moves the recall cursor one step towards newer lines. `None` means the cursor
    /// moved past the newest line and recall is over.
    fn recall_next(&mut self, prefix: &str) -> Option<String>;

    /// Ends recall, so the next [`Self::recall_previous`] starts at the newest line.
    fn reset_recall(&mut self);

    /// Lines from other groups are not recalled.
    fn current_group_id(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub line: String,
    pub group_id: u32,
}

/// See the module docs. Empty lines and a repeat of the newest line are not archived.
#[derive(Debug, Clone)]
pub struct InMemoryHistory {
    pub entries: VecDeque<HistoryEntry>,
    pub max_size: usize,
    group_id: u32,
    recall_position: Option<usize>,
}

impl Default for InMemoryHistory {
    fn default() -> Self { Self::new(HISTORY_SIZE_MAX) }
}

impl InMemoryHistory {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_size,
            group_id: 0,
            recall_position: None,
        }
    }

    pub fn set_group_id(&mut self, group_id: u32) {
        self.group_id = group_id;
        self.recall_position = None;
    }

    fn is_match(&self, index: usize, prefix: &str) -> bool {
        let entry = &self.entries[index];
        entry.group_id == self.group_id && entry.line.starts_with(prefix)
    }
}

impl HistoryStore for InMemoryHistory {
    fn append(&mut self, line: &str) {
        self.recall_position = None;

        let is_repeat = self
            .entries
            .back()
            .is_some_and(|it| it.line == line && it.group_id == self.group_id);
        if line.is_empty() || is_repeat || self.max_size == 0 {
            return;
        }

        self.entries.push_back(HistoryEntry {
            line: line.to_owned(),
            group_id: self.group_id,
        });
        while self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
    }

    fn recall_previous(&mut self, prefix: &str) -> Option<String> {
        let start = self.recall_position.unwrap_or(self.entries.len());
        let index = (0..start).rev().find(|it| self.is_match(*it, prefix))?;
        self.recall_position = Some(index);
        Some(self.entries[index].line.clone())
    }

    fn recall_next(&mut self, prefix: &str) -> Option<String> {
        let start = self.recall_position? + 1;
        match (start..self.entries.len()).find(|it| self.is_match(*it, prefix)) {
            Some(index) => {
                self.recall_position = Some(index);
                Some(self.entries[index].line.clone())
            }
            None => {
                self.recall_position = None;
                None
            }
        }
    }

    fn reset_recall(&mut self) { self.recall_position = None; }

    fn current_group_id(&self) -> u32 { self.group_id }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn history_of(lines: &[&str]) -> InMemoryHistory {
        let mut history = InMemoryHistory::default();
        for line in lines {
            history.append(line);
        }
        history
    }

    #[test]
    fn test_append_skips_empty_and_repeats() {
        let mut history = InMemoryHistory::new(2);
        history.append("test1");
        history.append("");
        history.append("test1");
        assert_eq!(history.entries.len(), 1);

        history.append("test2");
        history.append("test3");
        let lines: Vec<_> = history.entries.iter().map(|it| it.line.as_str()).collect();
        assert_eq!(lines, vec!["test2", "test3"]);
    }

    #[test]
    fn test_recall_walks_back_and_forth() {
        let mut history = history_of(&["one", "two", "three"]);
        assert_eq!(history.recall_next(""), None);
        assert_eq!(history.recall_previous("").as_deref(), Some("three"));
        assert_eq!(history.recall_previous("").as_deref(), Some("two"));
        assert_eq!(history.recall_previous("").as_deref(), Some("one"));
        assert_eq!(history.recall_previous(""), None);
        assert_eq!(history.recall_next("").as_deref(), Some("two"));
        assert_eq!(history.recall_next("").as_deref(), Some("three"));
        assert_eq!(history.recall_next(""), None);
        assert_eq!(history.recall_previous("").as_deref(), Some("three"));
    }

    #[test]
    fn test_prefix_search() {
        let mut history = history_of(&["ls -l", "cd /tmp", "ls -a", "pwd"]);
        assert_eq!(history.recall_previous("ls").as_deref(), Some("ls -a"));
        assert_eq!(history.recall_previous("ls").as_deref(), Some("ls -l"));
        assert_eq!(history.recall_next("ls").as_deref(), Some("ls -a"));
    }

    #[test]
    fn test_append_resets_recall() {
        let mut history = history_of(&["one", "two"]);
        history.recall_previous("");
        history.recall_previous("");
        history.append("three");
        assert_eq!(history.recall_previous("").as_deref(), Some("three"));
    }

    #[test]
    fn test_groups_are_separate() {
        let mut history = history_of(&["zero"]);
        history.set_group_id(7);
        history.append("seven");
        assert_eq!(history.recall_previous("").as_deref(), Some("seven"));
        assert_eq!(history.recall_previous(""), None);
        history.set_group_id(0);
        assert_eq!(history.recall_previous("").as_deref(), Some("zero"));
    }
}
