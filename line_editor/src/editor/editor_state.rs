// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The mutable state of one editor, and the primitive buffer operations that every
//! editing action is built from. The primitives keep the cursor and mark inside the
//! line, save the vi undo snapshot before the first mutation of an action, and feed
//! typed bytes into the vi repeat recording.

use super::{CharSearch, EditBuffer, LineEditorError, Prompt, SearchDirection, ViState};
use crate::{EditAction, EditMode, KeySequence};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertMode {
    #[default]
    Insert,
    Overwrite,
}

/// A repeat count typed before an action (`M-1 M-2 ^F` or `12l` in vi).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumericArgument {
    value: Option<usize>,
}

impl NumericArgument {
    /// Upper bound, so an absurd count can't spin for ages.
    pub const MAX: usize = 1_000_000;

    #[must_use]
    pub fn is_active(&self) -> bool { self.value.is_some() }

    pub fn fold_digit(&mut self, digit: u8) {
        let digit = usize::from(digit.wrapping_sub(b'0')).min(9);
        let value = self.value.unwrap_or(0);
        self.value = Some((value * 10 + digit).min(Self::MAX));
    }

    pub fn take(&mut self) -> Option<usize> { self.value.take() }

    pub fn clear(&mut self) { self.value = None; }
}

/// An action waiting for the next input byte as its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingArgument {
    pub action: EditAction,
    pub count: usize,
    pub explicit_count: bool,
    pub from_command_mode: bool,
}

/// History recall in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryBrowse {
    /// The line that was being edited before recall started.
    pub saved_line: Option<Vec<u8>>,
    /// What `history-search-*` matches against.
    pub search_prefix: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViCharClass {
    Space,
    Word,
    Punctuation,
}

fn vi_char_class(byte: u8) -> ViCharClass {
    if byte.is_ascii_whitespace() {
        ViCharClass::Space
    } else if is_word_byte(byte) {
        ViCharClass::Word
    } else {
        ViCharClass::Punctuation
    }
}

/// Letters, digits, `_`, and every non-ASCII byte (so UTF-8 text counts as words).
#[must_use]
pub fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte >= 0x80
}

/// See the module docs.
#[derive(Debug)]
pub struct EditorState {
    pub buffer: EditBuffer,
    pub cursor: usize,
    pub mark: usize,
    pub insert_mode: InsertMode,
    pub numeric_argument: NumericArgument,
    pub key_sequence: KeySequence,
    pub pending_argument: Option<PendingArgument>,
    pub vi: ViState,
    pub cut_buffer: Vec<u8>,
    pub edit_mode: EditMode,
    pub history_browse: HistoryBrowse,
    pub prompt: Prompt,
}

impl EditorState {
    /// # Errors
    ///
    /// [`LineEditorError::AllocationFailure`] when the buffer can't be reserved.
    pub fn try_new(capacity: usize, edit_mode: EditMode) -> Result<Self, LineEditorError> {
        Ok(Self {
            buffer: EditBuffer::try_new(capacity)?,
            cursor: 0,
            mark: 0,
            insert_mode: InsertMode::Insert,
            numeric_argument: NumericArgument::default(),
            key_sequence: KeySequence::new(),
            pending_argument: None,
            vi: ViState::default(),
            cut_buffer: Vec::new(),
            edit_mode,
            history_browse: HistoryBrowse::default(),
            prompt: Prompt::default(),
        })
    }

    /// Starts a new line from `seed`, with the cursor at `cursor` (default: the end).
    /// The cut buffer and the vi repeat record survive from line to line.
    pub fn reset_line(&mut self, seed: &[u8], cursor: Option<usize>) {
        self.buffer.set(seed);
        self.cursor = cursor.unwrap_or(usize::MAX).min(self.buffer.len());
        self.mark = 0;
        self.insert_mode = InsertMode::Insert;
        self.numeric_argument.clear();
        self.key_sequence.clear();
        self.pending_argument = None;
        self.history_browse = HistoryBrowse::default();
        self.vi.command_mode = false;
        self.vi.recording = None;
        self.vi.replaying = false;
        self.snapshot_for_undo();
    }

    #[must_use]
    pub fn is_vi(&self) -> bool { self.edit_mode == EditMode::Vi }

    #[must_use]
    pub fn in_vi_command_mode(&self) -> bool { self.is_vi() && self.vi.command_mode }

    #[must_use]
    pub fn line(&self) -> &[u8] { self.buffer.as_bytes() }

    #[must_use]
    pub fn len(&self) -> usize { self.buffer.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.buffer.is_empty() }

    /// Called before each dispatched action. In vi insert mode the snapshot taken on
    /// entry covers the whole insertion, so it is kept.
    pub fn begin_action(&mut self) {
        if !(self.is_vi() && !self.vi.command_mode) {
            self.vi.undo.saved = false;
        }
    }

    /// Saves the undo snapshot, at most once per action.
    pub fn save_undo(&mut self) {
        if !self.vi.undo.saved {
            self.snapshot_for_undo();
            self.vi.undo.saved = true;
        }
    }

    /// Unconditional snapshot (eg: on entering vi mode).
    pub fn snapshot_for_undo(&mut self) {
        self.vi.undo.line.clear();
        self.vi.undo.line.extend_from_slice(self.buffer.as_bytes());
        self.vi.undo.cursor = self.cursor;
        self.vi.undo.saved = false;
    }

    /// Swaps the line with the undo snapshot.
    pub fn swap_with_undo(&mut self) {
        let current = self.buffer.as_bytes().to_vec();
        let current_cursor = self.cursor;
        self.buffer.set(&self.vi.undo.line);
        self.cursor = self.vi.undo.cursor.min(self.buffer.len());
        self.vi.undo.line = current;
        self.vi.undo.cursor = current_cursor;
        self.clamp_mark();
    }

    /// Inserts (or overwrites, per [`InsertMode`]) at the cursor and moves the cursor
    /// past the new bytes. Returns how many bytes fit.
    pub fn insert_bytes(&mut self, bytes: &[u8]) -> usize {
        if bytes.is_empty() {
            return 0;
        }
        self.save_undo();
        let written = match self.insert_mode {
            InsertMode::Insert => self.buffer.insert(self.cursor, bytes),
            InsertMode::Overwrite => self.buffer.overwrite(self.cursor, bytes),
        };
        self.cursor += written;
        self.vi.record_inserted(&bytes[..written]);
        written
    }

    /// Removes `range` and parks the cursor at its start. With `to_cut_buffer` the
    /// removed bytes replace the cut buffer.
    pub fn delete_range(&mut self, range: Range<usize>, to_cut_buffer: bool) -> Vec<u8> {
        let end = range.end.min(self.buffer.len());
        let start = range.start.min(end);
        if start == end {
            return Vec::new();
        }
        self.save_undo();
        let removed = self.buffer.remove(start..end);
        self.cursor = start;
        if self.mark > start {
            self.mark = self.mark.saturating_sub(end - start).max(start);
        }
        self.clamp_mark();
        if to_cut_buffer {
            self.cut_buffer.clone_from(&removed);
        }
        removed
    }

    /// Replaces the line (eg: a recalled history entry), cursor at the end.
    pub fn replace_line(&mut self, bytes: &[u8]) {
        self.save_undo();
        self.buffer.set(bytes);
        self.cursor = self.buffer.len();
        self.clamp_mark();
    }

    pub fn set_cursor(&mut self, position: usize) { self.cursor = position.min(self.buffer.len()); }

    fn clamp_mark(&mut self) { self.mark = self.mark.min(self.buffer.len()); }

    fn byte_at(&self, index: usize) -> u8 { self.buffer.get(index).unwrap_or(b' ') }

    /// End of the `count`-th word after `from` (emacs `forward-word`).
    #[must_use]
    pub fn next_word_end(&self, from: usize, count: usize) -> usize {
        let len = self.buffer.len();
        let mut position = from.min(len);
        for _ in 0..count {
            while position < len && !is_word_byte(self.byte_at(position)) {
                position += 1;
            }
            while position < len && is_word_byte(self.byte_at(position)) {
                position += 1;
            }
        }
        position
    }

    /// Start of the `count`-th word before `from` (emacs `backward-word`).
    #[must_use]
    pub fn previous_word_start(&self, from: usize, count: usize) -> usize {
        let mut position = from.min(self.buffer.len());
        for _ in 0..count {
            while position > 0 && !is_word_byte(self.byte_at(position - 1)) {
                position -= 1;
            }
            while position > 0 && is_word_byte(self.byte_at(position - 1)) {
                position -= 1;
            }
        }
        position
    }

    /// Start of the `count`-th vi word after `from` (`w`).
    #[must_use]
    pub fn vi_next_word_start(&self, from: usize, count: usize) -> usize {
        let len = self.buffer.len();
        let mut position = from.min(len);
        for _ in 0..count {
            if position >= len {
                break;
            }
            let class = vi_char_class(self.byte_at(position));
            if class != ViCharClass::Space {
                while position < len && vi_char_class(self.byte_at(position)) == class {
                    position += 1;
                }
            }
            while position < len && vi_char_class(self.byte_at(position)) == ViCharClass::Space
            {
                position += 1;
            }
        }
        position
    }

    /// Start of the `count`-th vi word before `from` (`b`).
    #[must_use]
    pub fn vi_previous_word_start(&self, from: usize, count: usize) -> usize {
        let mut position = from.min(self.buffer.len());
        for _ in 0..count {
            while position > 0
                && vi_char_class(self.byte_at(position - 1)) == ViCharClass::Space
            {
                position -= 1;
            }
            if position == 0 {
                break;
            }
            let class = vi_char_class(self.byte_at(position - 1));
            while position > 0 && vi_char_class(self.byte_at(position - 1)) == class {
                position -= 1;
            }
        }
        position
    }

    /// Exclusive end of the `count`-th vi word starting at `from` (what `cw` changes).
    #[must_use]
    pub fn vi_word_end(&self, from: usize, count: usize) -> usize {
        let len = self.buffer.len();
        let mut position = from.min(len);
        for _ in 0..count {
            while position < len && vi_char_class(self.byte_at(position)) == ViCharClass::Space
            {
                position += 1;
            }
            if position >= len {
                break;
            }
            let class = vi_char_class(self.byte_at(position));
            while position < len && vi_char_class(self.byte_at(position)) == class {
                position += 1;
            }
        }
        position
    }

    /// Where `search` would put the cursor, looking for the `count`-th match from
    /// `from`. `repeat` skips an adjacent match for the exclusive (`t`/`T`) searches,
    /// so repeating one makes progress.
    #[must_use]
    pub fn find_char(
        &self,
        search: CharSearch,
        from: usize,
        count: usize,
        repeat: bool,
    ) -> Option<usize> {
        let line = self.buffer.as_bytes();
        let skip = usize::from(repeat && !search.inclusive);
        let mut position = from;
        for _ in 0..count.max(1) {
            position = match search.direction {
                SearchDirection::Forward => {
                    let start = position + 1 + skip;
                    start
                        + line.get(start..)?.iter().position(|it| *it == search.byte)?
                }
                SearchDirection::Backward => {
                    let end = position.checked_sub(skip)?;
                    line.get(..end)?.iter().rposition(|it| *it == search.byte)?
                }
            };
        }
        Some(match (search.direction, search.inclusive) {
            (_, true) => position,
            (SearchDirection::Forward, false) => position - 1,
            (SearchDirection::Backward, false) => position + 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn state_with(line: &str, cursor: usize) -> EditorState {
        let mut state = EditorState::try_new(64, EditMode::Emacs).unwrap();
        state.reset_line(line.as_bytes(), Some(cursor));
        state
    }

    #[test_case("foo bar baz", 0, 1, 3)]
    #[test_case("foo bar baz", 3, 1, 7)]
    #[test_case("foo bar baz", 0, 2, 7)]
    #[test_case("  --foo", 0, 1, 7)]
    fn test_next_word_end(line: &str, from: usize, count: usize, expected: usize) {
        assert_eq!(state_with(line, from).next_word_end(from, count), expected);
    }

    #[test_case("foo bar baz", 11, 1, 8)]
    #[test_case("foo bar baz", 8, 1, 4)]
    #[test_case("foo bar", 5, 2, 0)]
    fn test_previous_word_start(line: &str, from: usize, count: usize, expected: usize) {
        assert_eq!(state_with(line, from).previous_word_start(from, count), expected);
    }

    #[test_case("abc bar baz", 2, 1, 4)]
    #[test_case("foo.bar baz", 0, 1, 3)]
    #[test_case("foo.bar baz", 3, 1, 4)]
    #[test_case("foo bar", 0, 5, 7)]
    fn test_vi_next_word_start(line: &str, from: usize, count: usize, expected: usize) {
        assert_eq!(state_with(line, from).vi_next_word_start(from, count), expected);
    }

    #[test_case("foo bar", 4, 1, 0)]
    #[test_case("foo bar", 6, 1, 4)]
    #[test_case("foo.bar", 4, 1, 3)]
    fn test_vi_previous_word_start(line: &str, from: usize, count: usize, expected: usize) {
        assert_eq!(state_with(line, from).vi_previous_word_start(from, count), expected);
    }

    #[test_case("foo bar", 0, 1, 3)]
    #[test_case("foo bar", 1, 1, 3)]
    #[test_case("foo bar", 3, 1, 7)]
    #[test_case("foo bar baz", 0, 2, 7)]
    fn test_vi_word_end(line: &str, from: usize, count: usize, expected: usize) {
        assert_eq!(state_with(line, from).vi_word_end(from, count), expected);
    }

    #[test]
    fn test_find_char() {
        let state = state_with("a,b,c,d", 0);
        let forward = CharSearch {
            byte: b',',
            direction: SearchDirection::Forward,
            inclusive: true,
        };
        assert_eq!(state.find_char(forward, 0, 1, false), Some(1));
        assert_eq!(state.find_char(forward, 0, 3, false), Some(5));
        assert_eq!(state.find_char(forward, 0, 4, false), None);

        let till = CharSearch {
            inclusive: false,
            ..forward
        };
        assert_eq!(state.find_char(till, 0, 1, false), Some(0));
        // Repeating from right before a match moves on to the next one.
        assert_eq!(state.find_char(till, 0, 1, true), Some(2));

        let backward = CharSearch {
            direction: SearchDirection::Backward,
            ..forward
        };
        assert_eq!(state.find_char(backward, 6, 1, false), Some(5));
        assert_eq!(state.find_char(backward, 0, 1, false), None);
    }

    #[test]
    fn test_undo_snapshot_once_per_action() {
        let mut state = state_with("abc", 3);
        state.begin_action();
        state.insert_bytes(b"d");
        state.insert_bytes(b"e");
        assert_eq!(state.vi.undo.line, b"abc");

        state.begin_action();
        state.delete_range(0..1, true);
        assert_eq!(state.vi.undo.line, b"abcde");
        assert_eq!(state.cut_buffer, b"a");

        state.swap_with_undo();
        assert_eq!(state.line(), b"abcde");
        state.swap_with_undo();
        assert_eq!(state.line(), b"bcde");
    }

    #[test]
    fn test_numeric_argument() {
        let mut argument = NumericArgument::default();
        assert!(!argument.is_active());
        argument.fold_digit(b'1');
        argument.fold_digit(b'2');
        assert_eq!(argument.take(), Some(12));
        assert!(!argument.is_active());
    }
}
