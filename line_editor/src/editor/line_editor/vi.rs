// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::ActionArgs;
use crate::{InsertMode, LineEditor, LineEditorError};
use std::ops::Range;

impl LineEditor {
    /// `ESC` from insert mode. The cursor steps back onto the last inserted character.
    pub(super) fn vi_command_mode(&mut self) {
        if self.state.vi.command_mode {
            return;
        }
        self.state.vi.command_mode = true;
        self.state.insert_mode = InsertMode::Insert;
        self.state.cursor = self.state.cursor.saturating_sub(1);
    }

    /// The snapshot saved here is what `u` restores after the insertion.
    pub(super) fn vi_enter_insert(&mut self, mode: InsertMode) {
        self.state.save_undo();
        self.state.vi.command_mode = false;
        self.state.insert_mode = mode;
    }

    /// Deletes `range` into the cut buffer and starts inserting in its place.
    pub(super) fn vi_change(&mut self, range: Range<usize>) {
        self.state.save_undo();
        self.state.delete_range(range.clone(), true);
        self.state.set_cursor(range.start);
        self.vi_enter_insert(InsertMode::Insert);
    }

    /// `r`: replaces `count` characters, leaving the cursor on the last one.
    pub(super) fn vi_replace_char(
        &mut self,
        replacement: u8,
        count: usize,
    ) -> Result<(), LineEditorError> {
        let cursor = self.state.cursor;
        let end = cursor.saturating_add(count);
        if count == 0 || end > self.state.len() {
            return self.ring_bell();
        }
        self.state.save_undo();
        self.state.buffer.transform(cursor..end, |_, _| replacement);
        self.state.cursor = end - 1;
        Ok(())
    }

    /// `.`: replays the last change made from command mode, including what was typed
    /// if it entered insert mode. An explicit count replaces the recorded one.
    pub(super) fn vi_repeat_change(&mut self, args: &ActionArgs) -> Result<(), LineEditorError> {
        let Some(record) = self.state.vi.last_change.clone() else {
            return self.ring_bell();
        };
        let count = if args.explicit_count {
            args.count
        } else {
            record.count
        };
        let replay_args = ActionArgs {
            count,
            explicit_count: args.explicit_count,
            key: args.key,
            char_arg: record.char_argument,
        };

        self.state.vi.replaying = true;
        let outcome = self.execute(record.action, replay_args);
        if outcome.is_ok() && !self.state.vi.command_mode {
            if !record.inserted.is_empty()
                && self.state.insert_bytes(&record.inserted) < record.inserted.len()
            {
                self.state.vi.replaying = false;
                self.vi_command_mode();
                return self.ring_bell();
            }
            self.vi_command_mode();
        }
        self.state.vi.replaying = false;
        outcome.map(|_| ())
    }
}
