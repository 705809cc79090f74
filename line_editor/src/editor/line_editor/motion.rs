// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{CharSearch, LineEditor, LineEditorError, SearchDirection};

impl LineEditor {
    /// Furthest cursor position. Vi command mode keeps the cursor on a character.
    pub(crate) fn cursor_limit(&self) -> usize {
        let len = self.state.len();
        if self.state.in_vi_command_mode() {
            len.saturating_sub(1)
        } else {
            len
        }
    }

    pub(crate) fn move_cursor(&mut self, position: usize) {
        self.state.cursor = position.min(self.cursor_limit());
    }

    pub(crate) fn clamp_cursor(&mut self) { self.move_cursor(self.state.cursor); }

    pub(super) fn cursor_left(&mut self, count: usize) {
        self.move_cursor(self.state.cursor.saturating_sub(count));
    }

    pub(super) fn cursor_right(&mut self, count: usize) {
        self.move_cursor(self.state.cursor.saturating_add(count));
    }

    /// Emacs moves past the end of the word, vi (`e`) stops on its last character.
    pub(super) fn forward_word(&mut self, count: usize) {
        let cursor = self.state.cursor;
        let target = if self.state.in_vi_command_mode() {
            self.state.next_word_end(cursor + 1, count).saturating_sub(1)
        } else {
            self.state.next_word_end(cursor, count)
        };
        self.move_cursor(target);
    }

    pub(super) fn find_char(
        &mut self,
        byte: u8,
        direction: SearchDirection,
        inclusive: bool,
        count: usize,
    ) -> Result<(), LineEditorError> {
        let search = CharSearch {
            byte,
            direction,
            inclusive,
        };
        self.state.vi.last_search = Some(search);
        self.jump_to_char(search, count, false)
    }

    /// `;` and `,`.
    pub(super) fn repeat_find_char(
        &mut self,
        invert: bool,
        count: usize,
    ) -> Result<(), LineEditorError> {
        let Some(mut search) = self.state.vi.last_search else {
            return self.ring_bell();
        };
        if invert {
            search.direction = search.direction.reversed();
        }
        self.jump_to_char(search, count, true)
    }

    fn jump_to_char(
        &mut self,
        search: CharSearch,
        count: usize,
        repeat: bool,
    ) -> Result<(), LineEditorError> {
        match self.state.find_char(search, self.state.cursor, count, repeat) {
            Some(position) => {
                self.move_cursor(position);
                Ok(())
            }
            None => self.ring_bell(),
        }
    }
}
