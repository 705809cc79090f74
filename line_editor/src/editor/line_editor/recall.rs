// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! History recall actions. The line being edited when recall starts is saved, and
//! comes back when recall walks past the newest line.

use crate::{HistoryBrowse, LineEditor, LineEditorError};

impl LineEditor {
    fn begin_history_browse(&mut self) {
        let browse = &mut self.state.history_browse;
        if browse.saved_line.is_none() {
            browse.saved_line = Some(self.state.buffer.as_bytes().to_vec());
        }
    }

    /// Any non history action ends recall. The next recall starts at the newest line.
    pub(crate) fn end_history_browse(&mut self) {
        if self.state.history_browse != HistoryBrowse::default() {
            self.state.history_browse = HistoryBrowse::default();
            self.history.reset_recall();
        }
    }

    fn restore_saved_line(&mut self) {
        if let Some(saved_line) = self.state.history_browse.saved_line.take() {
            self.state.replace_line(&saved_line);
        }
        self.end_history_browse();
    }

    pub(super) fn up_history(&mut self, count: usize) -> Result<(), LineEditorError> {
        self.begin_history_browse();
        self.state.history_browse.search_prefix = None;
        let mut recalled = None;
        for _ in 0..count {
            match self.history.recall_previous("") {
                Some(line) => recalled = Some(line),
                None => break,
            }
        }
        match recalled {
            Some(line) => {
                self.state.replace_line(line.as_bytes());
                Ok(())
            }
            None => self.ring_bell(),
        }
    }

    pub(super) fn down_history(&mut self, count: usize) -> Result<(), LineEditorError> {
        if self.state.history_browse.saved_line.is_none() {
            return self.ring_bell();
        }
        self.state.history_browse.search_prefix = None;
        for _ in 0..count {
            match self.history.recall_next("") {
                Some(line) => self.state.replace_line(line.as_bytes()),
                None => {
                    self.restore_saved_line();
                    break;
                }
            }
        }
        Ok(())
    }

    /// Matches against what was left of the cursor when the search started.
    fn search_prefix(&mut self) -> String {
        if let Some(prefix) = &self.state.history_browse.search_prefix {
            return prefix.clone();
        }
        let prefix = String::from_utf8_lossy(&self.state.line()[..self.state.cursor]).into_owned();
        self.state.history_browse.search_prefix = Some(prefix.clone());
        prefix
    }

    fn show_search_match(&mut self, line: &str, prefix: &str) {
        self.state.replace_line(line.as_bytes());
        self.state.set_cursor(prefix.len());
    }

    pub(super) fn history_search_backward(&mut self, count: usize) -> Result<(), LineEditorError> {
        self.begin_history_browse();
        let prefix = self.search_prefix();
        let mut recalled = None;
        for _ in 0..count {
            match self.history.recall_previous(&prefix) {
                Some(line) => recalled = Some(line),
                None => break,
            }
        }
        match recalled {
            Some(line) => {
                self.show_search_match(&line, &prefix);
                Ok(())
            }
            None => self.ring_bell(),
        }
    }

    pub(super) fn history_search_forward(&mut self, count: usize) -> Result<(), LineEditorError> {
        if self.state.history_browse.saved_line.is_none() {
            return self.ring_bell();
        }
        let prefix = self.search_prefix();
        for _ in 0..count {
            match self.history.recall_next(&prefix) {
                Some(line) => self.show_search_match(&line, &prefix),
                None => {
                    self.restore_saved_line();
                    break;
                }
            }
        }
        Ok(())
    }

    pub(super) fn beginning_of_history(&mut self) -> Result<(), LineEditorError> {
        self.begin_history_browse();
        self.state.history_browse.search_prefix = None;
        let mut oldest = None;
        while let Some(line) = self.history.recall_previous("") {
            oldest = Some(line);
        }
        match oldest {
            Some(line) => {
                self.state.replace_line(line.as_bytes());
                Ok(())
            }
            None => self.ring_bell(),
        }
    }

    pub(super) fn end_of_history(&mut self) { self.restore_saved_line(); }
}
