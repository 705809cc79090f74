// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::EditAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Forward,
    Backward,
}

impl SearchDirection {
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Backward,
            SearchDirection::Backward => SearchDirection::Forward,
        }
    }
}

/// The last find-char request, replayed by `repeat-find-char` and
/// `invert-refind-char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharSearch {
    pub byte: u8,
    pub direction: SearchDirection,
    /// `f`/`F` land on the character, `t`/`T` stop next to it.
    pub inclusive: bool,
}

/// Line and cursor saved before a change, restored (swapped, really) by `vi-undo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoSnapshot {
    pub line: Vec<u8>,
    pub cursor: usize,
    /// Set once the current action has saved a snapshot.
    pub saved: bool,
}

/// A change made from command mode, replayed by `vi-repeat-change`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatRecord {
    pub action: EditAction,
    pub count: usize,
    pub char_argument: Option<u8>,
    /// What was typed in insert mode when the change left the editor there.
    pub inserted: Vec<u8>,
}

/// Vi sub-state of the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViState {
    /// Command mode when true, insert mode otherwise.
    pub command_mode: bool,
    pub last_search: Option<CharSearch>,
    pub undo: UndoSnapshot,
    pub last_change: Option<RepeatRecord>,
    /// A change that entered insert mode and is still collecting typed bytes.
    pub recording: Option<RepeatRecord>,
    pub replaying: bool,
}

impl ViState {
    /// Collects a byte typed while a change is being recorded in insert mode.
    pub fn record_inserted(&mut self, bytes: &[u8]) {
        if !self.command_mode
            && !self.replaying
            && let Some(record) = self.recording.as_mut()
        {
            record.inserted.extend_from_slice(bytes);
        }
    }

    /// Drops the last recorded byte when it is erased in insert mode.
    pub fn unrecord_inserted(&mut self) {
        if !self.command_mode
            && !self.replaying
            && let Some(record) = self.recording.as_mut()
        {
            record.inserted.pop();
        }
    }

    /// Turns the recording into the change replayed by `vi-repeat-change`.
    pub fn finish_recording(&mut self) {
        if let Some(record) = self.recording.take() {
            self.last_change = Some(record);
        }
    }
}
