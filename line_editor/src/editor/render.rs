// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Diff based line rendering.
//!
//! [`Renderer`] remembers the cells it last drew after the prompt, so each refresh only
//! rewrites from the first cell that changed, and clears the tail when the line got
//! shorter. Positions are counted in cells from the first column of the prompt, so
//! `position / width` is the row and `position % width` is the column.
//!
//! Terminals differ in what happens after a character lands in the last column (some
//! wrap at once, some wait for the next character). The renderer always emits a
//! carriage return and a cursor-down at that point, so the cursor position is known
//! either way.

use super::Prompt;
use crate::{Capability, ControlStrings, Size, push_displayed_byte};
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

pub const DEBUG_RENDER: bool = false;

/// See the module docs.
#[derive(Debug, Clone)]
pub struct Renderer {
    pub control_strings: ControlStrings,
    pub size: Size,
    displayed: Vec<u8>,
    prompt_shown: bool,
    prompt_width: usize,
    prompt_cells: Vec<Vec<u8>>,
    position: usize,
}

impl Renderer {
    #[must_use]
    pub fn new(control_strings: ControlStrings, size: Size) -> Self {
        Self {
            control_strings,
            size,
            displayed: vec![],
            prompt_shown: false,
            prompt_width: 0,
            prompt_cells: vec![],
            position: 0,
        }
    }

    /// Forgets what is on screen, so the next refresh starts by writing the prompt at
    /// the current terminal cursor.
    pub fn forget(&mut self) {
        self.displayed.clear();
        self.prompt_shown = false;
        self.position = 0;
    }

    #[must_use]
    pub fn is_prompt_shown(&self) -> bool { self.prompt_shown }

    /// Brings the screen in line with `line` and puts the terminal cursor on `cursor`.
    ///
    /// # Errors
    ///
    /// Errors from `out`.
    pub fn refresh(
        &mut self,
        out: &mut dyn Write,
        prompt: &Prompt,
        line: &[u8],
        cursor: usize,
    ) -> io::Result<()> {
        if !self.prompt_shown {
            self.write_prompt(out, prompt)?;
        }

        let mut cells = Vec::with_capacity(line.len());
        let mut cursor_cell = None;
        for (index, &byte) in line.iter().enumerate() {
            if index == cursor {
                cursor_cell = Some(cells.len());
            }
            push_displayed_byte(byte, self.prompt_width + cells.len(), &mut cells);
        }
        let cursor_cell = cursor_cell.unwrap_or(cells.len());

        let first_difference = self
            .displayed
            .iter()
            .zip(&cells)
            .take_while(|(old, new)| old == new)
            .count();

        if first_difference < cells.len() || first_difference < self.displayed.len() {
            self.move_to(out, self.prompt_width + first_difference)?;
            self.write_cells(out, &cells[first_difference..])?;
            let stale = self.displayed.len().saturating_sub(cells.len());
            if stale > 0 {
                if self.control_strings.has(Capability::ClearToEndOfDisplay) {
                    out.write_all(self.control_strings.get(Capability::ClearToEndOfDisplay))?;
                } else {
                    self.write_cells(out, &vec![b' '; stale])?;
                }
            }
        }

        DEBUG_RENDER.then(|| {
            tracing::debug!(message = "refresh", first_difference, cells = cells.len(), cursor_cell);
        });
        self.displayed = cells;
        self.move_to(out, self.prompt_width + cursor_cell)?;
        out.flush()
    }

    /// Moves below the line and forgets it, so whatever is written next starts on a
    /// fresh row.
    ///
    /// # Errors
    ///
    /// Errors from `out`.
    pub fn finish_line(&mut self, out: &mut dyn Write) -> io::Result<()> {
        if self.prompt_shown {
            let end = self.prompt_width + self.displayed.len();
            self.move_to(out, end)?;
            if end == 0 || end % self.size.width() != 0 {
                self.new_row(out)?;
            } else {
                out.write_all(self.control_strings.get(Capability::CarriageReturn))?;
            }
        }
        self.forget();
        out.flush()
    }

    /// Erases the prompt and line when the terminal can, otherwise starts a new row.
    /// Either way the next refresh draws everything again.
    ///
    /// # Errors
    ///
    /// Errors from `out`.
    pub fn erase_line(&mut self, out: &mut dyn Write) -> io::Result<()> {
        if !self.prompt_shown {
            return Ok(());
        }
        if self.control_strings.has(Capability::ClearToEndOfDisplay)
            && self.control_strings.has(Capability::CursorUp)
        {
            self.move_to(out, 0)?;
            out.write_all(self.control_strings.get(Capability::ClearToEndOfDisplay))?;
            self.forget();
            out.flush()
        } else {
            self.finish_line(out)
        }
    }

    /// # Errors
    ///
    /// Errors from `out`.
    pub fn clear_screen(&mut self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.control_strings.get(Capability::ClearScreen))?;
        self.forget();
        Ok(())
    }

    /// # Errors
    ///
    /// Errors from `out`.
    pub fn ring_bell(&mut self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.control_strings.get(Capability::Bell))?;
        out.flush()
    }

    fn write_prompt(&mut self, out: &mut dyn Write, prompt: &Prompt) -> io::Result<()> {
        out.write_all(&prompt.rendered)?;
        self.prompt_width = prompt.width;
        self.prompt_cells = prompt_cells(&prompt.plain);
        self.position = prompt.width;
        self.displayed.clear();
        self.prompt_shown = true;
        if self.position > 0 && self.position % self.size.width() == 0 {
            self.new_row(out)?;
        }
        Ok(())
    }

    fn new_row(&mut self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.control_strings.get(Capability::CarriageReturn))?;
        out.write_all(self.control_strings.get(Capability::CursorDown))
    }

    fn write_cells(&mut self, out: &mut dyn Write, cells: &[u8]) -> io::Result<()> {
        let width = self.size.width();
        for cell in cells {
            out.write_all(std::slice::from_ref(cell))?;
            self.position += 1;
            if self.position % width == 0 {
                self.new_row(out)?;
            }
        }
        Ok(())
    }

    fn move_to(&mut self, out: &mut dyn Write, target: usize) -> io::Result<()> {
        let width = self.size.width();
        let (target_row, target_column) = (target / width, target % width);
        let (mut row, mut column) = (self.position / width, self.position % width);

        let strings = &self.control_strings;
        while row > target_row {
            out.write_all(strings.get(Capability::CursorUp))?;
            row -= 1;
        }
        while row < target_row {
            out.write_all(strings.get(Capability::CarriageReturn))?;
            out.write_all(strings.get(Capability::CursorDown))?;
            row += 1;
            column = 0;
        }

        if target_column < column {
            if target_column == 0 || !strings.has(Capability::CursorLeft) {
                out.write_all(strings.get(Capability::CarriageReturn))?;
                column = 0;
            } else {
                for _ in target_column..column {
                    out.write_all(strings.get(Capability::CursorLeft))?;
                }
                column = target_column;
            }
        }
        if target_column > column {
            if strings.has(Capability::CursorRight) {
                for _ in column..target_column {
                    out.write_all(strings.get(Capability::CursorRight))?;
                }
            } else {
                self.reprint(out, row * width + column, target)?;
            }
        }

        self.position = target;
        Ok(())
    }

    /// Moves right by writing over cells with what is already on them.
    fn reprint(&self, out: &mut dyn Write, from: usize, to: usize) -> io::Result<()> {
        for cell in from..to {
            if cell < self.prompt_width {
                if let Some(bytes) = self.prompt_cells.get(cell) {
                    out.write_all(bytes)?;
                }
            } else if let Some(byte) = self.displayed.get(cell - self.prompt_width) {
                out.write_all(std::slice::from_ref(byte))?;
            }
        }
        Ok(())
    }
}

/// One entry per column. A wide character sits in its first column and leaves the
/// others empty.
fn prompt_cells(plain: &str) -> Vec<Vec<u8>> {
    let mut acc: Vec<Vec<u8>> = Vec::with_capacity(plain.len());
    let mut utf8 = [0; 4];
    for it in plain.chars() {
        let bytes = it.encode_utf8(&mut utf8).as_bytes();
        match it.width().unwrap_or(0) {
            0 => match acc.last_mut() {
                Some(last) => last.extend_from_slice(bytes),
                None => acc.push(bytes.to_vec()),
            },
            width => {
                acc.push(bytes.to_vec());
                acc.resize(acc.len() + width - 1, vec![]);
            }
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuiltinCapabilities, PromptStyle};
    use pretty_assertions::assert_eq;

    fn prompt(text: &str) -> Prompt { Prompt::new(text, PromptStyle::Literal, &ControlStrings::ansi()) }

    fn take(out: &mut Vec<u8>) -> String { String::from_utf8(std::mem::take(out)).unwrap() }

    #[test]
    fn test_only_changed_cells_are_written() {
        let mut renderer = Renderer::new(ControlStrings::ansi(), Size::new(80, 24));
        let prompt = prompt("> ");
        let mut out = vec![];

        renderer.refresh(&mut out, &prompt, b"ab", 2).unwrap();
        assert_eq!(take(&mut out), "> ab");

        renderer.refresh(&mut out, &prompt, b"abc", 3).unwrap();
        assert_eq!(take(&mut out), "c");

        renderer.refresh(&mut out, &prompt, b"ac", 1).unwrap();
        assert_eq!(take(&mut out), "\x08\x08c\x1b[J\x08");
    }

    #[test]
    fn test_control_bytes_and_tabs() {
        let mut renderer = Renderer::new(ControlStrings::ansi(), Size::new(80, 24));
        let mut out = vec![];
        renderer.refresh(&mut out, &prompt(""), b"a\x01\tb", 4).unwrap();
        assert_eq!(take(&mut out), "a^A     b");
    }

    #[test]
    fn test_wrap_then_move_back_up() {
        let mut renderer = Renderer::new(ControlStrings::ansi(), Size::new(5, 24));
        let prompt = prompt("> ");
        let mut out = vec![];

        renderer.refresh(&mut out, &prompt, b"abc", 3).unwrap();
        assert_eq!(take(&mut out), "> abc\r\n");

        renderer.refresh(&mut out, &prompt, b"ab", 2).unwrap();
        assert_eq!(take(&mut out), "\x1b[A\x1b[C\x1b[C\x1b[C\x1b[C\x1b[J");
    }

    #[test]
    fn test_finish_line() {
        let mut renderer = Renderer::new(ControlStrings::ansi(), Size::new(80, 24));
        let mut out = vec![];
        renderer.refresh(&mut out, &prompt("> "), b"abc", 0).unwrap();
        take(&mut out);
        renderer.finish_line(&mut out).unwrap();
        assert_eq!(take(&mut out), "\x1b[C\x1b[C\x1b[C\r\n");
        assert!(!renderer.is_prompt_shown());
    }

    #[test]
    fn test_dumb_terminal_reprints_to_move_right() {
        let strings = ControlStrings::resolve(&BuiltinCapabilities, "dumb");
        let mut renderer = Renderer::new(strings, Size::new(80, 24));
        let prompt = prompt("> ");
        let mut out = vec![];

        renderer.refresh(&mut out, &prompt, b"abc", 3).unwrap();
        take(&mut out);
        renderer.refresh(&mut out, &prompt, b"abc", 0).unwrap();
        assert_eq!(take(&mut out), "\x08\x08\x08");
        renderer.refresh(&mut out, &prompt, b"abc", 2).unwrap();
        assert_eq!(take(&mut out), "ab");
    }
}
