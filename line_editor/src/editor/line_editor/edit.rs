// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{LineEditor, LineEditorError, is_word_byte};
use std::ops::Range;

impl LineEditor {
    /// Vi command mode (`x`) keeps what it deletes in the cut buffer, emacs `^D`
    /// doesn't.
    pub(super) fn forward_delete_char(&mut self, count: usize) -> Result<(), LineEditorError> {
        let cursor = self.state.cursor;
        if cursor >= self.state.len() {
            return self.ring_bell();
        }
        let to_cut_buffer = self.state.in_vi_command_mode();
        self.state
            .delete_range(cursor..cursor.saturating_add(count), to_cut_buffer);
        Ok(())
    }

    pub(super) fn backward_delete_char(&mut self, count: usize) -> Result<(), LineEditorError> {
        let cursor = self.state.cursor;
        if cursor == 0 {
            return self.ring_bell();
        }
        let start = cursor.saturating_sub(count);
        let to_cut_buffer = self.state.in_vi_command_mode();
        self.state.delete_range(start..cursor, to_cut_buffer);
        for _ in start..cursor {
            self.state.vi.unrecord_inserted();
        }
        Ok(())
    }

    pub(super) fn forward_delete_word(&mut self, count: usize) {
        let cursor = self.state.cursor;
        let end = if self.state.is_vi() {
            self.state.vi_next_word_start(cursor, count)
        } else {
            self.state.next_word_end(cursor, count)
        };
        self.state.delete_range(cursor..end, true);
    }

    pub(super) fn backward_delete_word(&mut self, count: usize) {
        let cursor = self.state.cursor;
        let start = if self.state.is_vi() {
            self.state.vi_previous_word_start(cursor, count)
        } else {
            self.state.previous_word_start(cursor, count)
        };
        let removed = self.state.delete_range(start..cursor, true);
        for _ in &removed {
            self.state.vi.unrecord_inserted();
        }
    }

    pub(super) fn kill_line(&mut self) {
        let cursor = self.state.cursor;
        self.state.delete_range(cursor..self.state.len(), true);
    }

    /// Between the mark and the cursor, in either order.
    pub(super) fn region(&self) -> Range<usize> {
        let mark = self.state.mark.min(self.state.len());
        let cursor = self.state.cursor;
        mark.min(cursor)..mark.max(cursor)
    }

    /// Inserts the cut buffer `count` times. In vi command mode the cursor ends up on
    /// the last inserted character.
    pub(super) fn yank(&mut self, count: usize) -> Result<(), LineEditorError> {
        if self.state.cut_buffer.is_empty() {
            return self.ring_bell();
        }
        let text = self.state.cut_buffer.clone();
        for _ in 0..count {
            if self.state.insert_bytes(&text) < text.len() {
                self.ring_bell()?;
                break;
            }
        }
        if self.state.in_vi_command_mode() {
            self.state.cursor = self.state.cursor.saturating_sub(1);
        }
        Ok(())
    }

    /// Applies `f` from the cursor to the end of the `count`-th word and moves past it.
    pub(super) fn transform_words(&mut self, count: usize, f: fn(&u8) -> u8) {
        let cursor = self.state.cursor;
        let end = self.state.next_word_end(cursor, count);
        self.state.save_undo();
        self.state.buffer.transform(cursor..end, |_, byte| f(&byte));
        self.move_cursor(end);
    }

    pub(super) fn capitalize_words(&mut self, count: usize) {
        let cursor = self.state.cursor;
        let end = self.state.next_word_end(cursor, count);
        self.state.save_undo();
        let mut in_word = false;
        self.state.buffer.transform(cursor..end, |_, byte| {
            let is_word = is_word_byte(byte);
            let transformed = match (is_word, in_word) {
                (true, false) => byte.to_ascii_uppercase(),
                (true, true) => byte.to_ascii_lowercase(),
                (false, _) => byte,
            };
            in_word = is_word;
            transformed
        });
        self.move_cursor(end);
    }

    /// Vi `~`: toggles the case of `count` characters and moves past them.
    pub(super) fn change_case(&mut self, count: usize) -> Result<(), LineEditorError> {
        let cursor = self.state.cursor;
        let len = self.state.len();
        if cursor >= len {
            return self.ring_bell();
        }
        let end = cursor.saturating_add(count).min(len);
        self.state.save_undo();
        self.state.buffer.transform(cursor..end, |_, byte| {
            if byte.is_ascii_lowercase() {
                byte.to_ascii_uppercase()
            } else {
                byte.to_ascii_lowercase()
            }
        });
        self.move_cursor(end);
        Ok(())
    }

    /// Swaps the characters on either side of the cursor and moves forward. At the end
    /// of the line the last two characters are swapped.
    pub(super) fn transpose_chars(&mut self) -> Result<(), LineEditorError> {
        let cursor = self.state.cursor;
        let len = self.state.len();
        if cursor == 0 || len < 2 {
            return self.ring_bell();
        }
        self.state.save_undo();
        if cursor >= len {
            self.state.buffer.swap(len - 2, len - 1);
        } else {
            self.state.buffer.swap(cursor - 1, cursor);
            self.state.cursor = cursor + 1;
        }
        Ok(())
    }
}
