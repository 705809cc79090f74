// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{EditAction, EditMode, InsertMode, LineEditor, LineEditorError, PendingArgument,
            RepeatRecord, SearchDirection};
use libc::c_int;

/// What the read loop does after an input byte has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    /// The line is complete.
    LineDone,
    /// End of input was requested (eg: `^D` on an empty line).
    Eof,
    /// An action asked for this signal to be delivered (eg: `user-interrupt`).
    Signal(c_int),
}

/// Arguments of one dispatched action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ActionArgs {
    /// Repeat count, 1 unless a numeric argument was typed.
    pub count: usize,
    pub explicit_count: bool,
    /// The last byte of the key sequence that invoked the action.
    pub key: u8,
    /// The byte read after the key, for actions that take one.
    pub char_arg: Option<u8>,
}

impl ActionArgs {
    #[must_use]
    pub fn new(count: usize, explicit_count: bool, key: u8) -> Self {
        Self {
            count,
            explicit_count,
            key,
            char_arg: None,
        }
    }
}

fn is_history_action(action: EditAction) -> bool {
    matches!(
        action,
        EditAction::UpHistory
            | EditAction::DownHistory
            | EditAction::HistorySearchBackward
            | EditAction::HistorySearchForward
            | EditAction::BeginningOfHistory
            | EditAction::EndOfHistory
    )
}

impl LineEditor {
    /// Runs `action`, or parks it until the next byte arrives when it needs a
    /// character argument.
    pub(crate) fn dispatch(
        &mut self,
        action: EditAction,
        args: ActionArgs,
        from_command_mode: bool,
    ) -> Result<Flow, LineEditorError> {
        if action.takes_char_argument() && args.char_arg.is_none() {
            self.state.pending_argument = Some(PendingArgument {
                action,
                count: args.count,
                explicit_count: args.explicit_count,
                from_command_mode,
            });
            return Ok(Flow::Continue);
        }

        if !is_history_action(action) {
            self.end_history_browse();
        }
        self.state.begin_action();

        if action.is_change() && from_command_mode && !self.state.vi.replaying {
            self.state.vi.recording = Some(RepeatRecord {
                action,
                count: args.count,
                char_argument: args.char_arg,
                inserted: vec![],
            });
        }

        let flow = self.execute(action, args);

        // A change that stayed in command mode is complete. One that entered insert
        // mode keeps recording until the editor returns to command mode.
        if self.state.in_vi_command_mode() {
            self.state.vi.finish_recording();
        }
        flow
    }

    pub(crate) fn execute(
        &mut self,
        action: EditAction,
        args: ActionArgs,
    ) -> Result<Flow, LineEditorError> {
        let count = args.count;
        let char_arg = args.char_arg.unwrap_or(args.key);

        match action {
            // Cursor motion.
            EditAction::CursorLeft => self.cursor_left(count),
            EditAction::CursorRight => self.cursor_right(count),
            EditAction::BeginningOfLine => self.move_cursor(0),
            EditAction::EndOfLine => self.move_cursor(self.state.len()),
            EditAction::ForwardWord => self.forward_word(count),
            EditAction::BackwardWord => {
                self.move_cursor(self.state.previous_word_start(self.state.cursor, count));
            }
            EditAction::ViForwardWord => {
                self.move_cursor(self.state.vi_next_word_start(self.state.cursor, count));
            }
            EditAction::ViBackwardWord => {
                self.move_cursor(self.state.vi_previous_word_start(self.state.cursor, count));
            }
            EditAction::GotoColumn => self.move_cursor(count.saturating_sub(1)),
            EditAction::ForwardFindChar => {
                self.find_char(char_arg, SearchDirection::Forward, true, count)?;
            }
            EditAction::BackwardFindChar => {
                self.find_char(char_arg, SearchDirection::Backward, true, count)?;
            }
            EditAction::ForwardToChar => {
                self.find_char(char_arg, SearchDirection::Forward, false, count)?;
            }
            EditAction::BackwardToChar => {
                self.find_char(char_arg, SearchDirection::Backward, false, count)?;
            }
            EditAction::RepeatFindChar => self.repeat_find_char(false, count)?,
            EditAction::InvertRefindChar => self.repeat_find_char(true, count)?,

            // Deletion and the cut buffer.
            EditAction::ForwardDeleteChar => self.forward_delete_char(count)?,
            EditAction::BackwardDeleteChar => self.backward_delete_char(count)?,
            EditAction::ForwardDeleteWord => self.forward_delete_word(count),
            EditAction::BackwardDeleteWord => self.backward_delete_word(count),
            EditAction::KillLine => self.kill_line(),
            EditAction::BackwardKillLine => {
                self.state.delete_range(0..self.state.cursor, true);
            }
            EditAction::DeleteLine | EditAction::ViDeleteLine => {
                self.state.delete_range(0..self.state.len(), true);
            }
            EditAction::SetMark => self.state.mark = self.state.cursor,
            EditAction::ExchangePointAndMark => {
                let mark = self.state.mark.min(self.state.len());
                self.state.mark = self.state.cursor;
                self.state.cursor = mark;
            }
            EditAction::KillRegion => {
                let region = self.region();
                self.state.delete_range(region, true);
            }
            EditAction::CopyRegionAsKill => {
                let region = self.region();
                self.state.cut_buffer = self.state.line()[region].to_vec();
            }
            EditAction::Yank => self.yank(count)?,
            EditAction::AppendYank => {
                if !self.state.is_empty() {
                    self.state.set_cursor(self.state.cursor + 1);
                }
                self.yank(count)?;
            }

            // Transforms.
            EditAction::UpcaseWord => self.transform_words(count, u8::to_ascii_uppercase),
            EditAction::DowncaseWord => self.transform_words(count, u8::to_ascii_lowercase),
            EditAction::CapitalizeWord => self.capitalize_words(count),
            EditAction::ChangeCase => self.change_case(count)?,
            EditAction::TransposeChars => self.transpose_chars()?,
            EditAction::InsertMode => {
                self.state.insert_mode = match self.state.insert_mode {
                    InsertMode::Insert => InsertMode::Overwrite,
                    InsertMode::Overwrite => InsertMode::Insert,
                };
            }
            EditAction::LiteralNext => {
                for _ in 0..count {
                    if self.state.insert_bytes(&[char_arg]) == 0 {
                        self.ring_bell()?;
                        break;
                    }
                }
            }

            // Display.
            EditAction::Redisplay => self
                .renderer
                .erase_line(&mut *self.output)
                .map_err(LineEditorError::io("writing to the terminal"))?,
            EditAction::ClearScreen => self
                .renderer
                .clear_screen(&mut *self.output)
                .map_err(LineEditorError::io("writing to the terminal"))?,
            EditAction::RingBell => self.ring_bell()?,

            // History.
            EditAction::UpHistory => self.up_history(count)?,
            EditAction::DownHistory => self.down_history(count)?,
            EditAction::HistorySearchBackward => self.history_search_backward(count)?,
            EditAction::HistorySearchForward => self.history_search_forward(count)?,
            EditAction::BeginningOfHistory => self.beginning_of_history()?,
            EditAction::EndOfHistory => self.end_of_history(),

            // Completion.
            EditAction::CompleteWord => self.complete_word()?,
            EditAction::ListOrEof => {
                if self.state.is_empty() {
                    return Ok(Flow::Eof);
                }
                self.list_matches()?;
            }
            EditAction::DelCharOrListOrEof => {
                if self.state.is_empty() {
                    return Ok(Flow::Eof);
                }
                if self.state.cursor < self.state.len() {
                    self.forward_delete_char(count)?;
                } else {
                    self.list_matches()?;
                }
            }

            // Session control.
            EditAction::Newline => return Ok(Flow::LineDone),
            EditAction::UserInterrupt => return Ok(Flow::Signal(libc::SIGINT)),
            EditAction::Suspend => return Ok(Flow::Signal(libc::SIGTSTP)),
            EditAction::ReadInitFiles => self.read_init_files(),
            EditAction::DigitArgument => self.state.numeric_argument.fold_digit(args.key),
            EditAction::EmacsMode => self.set_edit_mode(EditMode::Emacs)?,
            EditAction::ViMode => {
                self.set_edit_mode(EditMode::Vi)?;
                self.state.snapshot_for_undo();
            }

            // Vi.
            EditAction::ViCommandMode => self.vi_command_mode(),
            EditAction::ViInsert => self.vi_enter_insert(InsertMode::Insert),
            EditAction::ViOverwrite => self.vi_enter_insert(InsertMode::Overwrite),
            EditAction::ViInsertAtBol => {
                self.state.cursor = 0;
                self.vi_enter_insert(InsertMode::Insert);
            }
            EditAction::ViAppend => {
                self.state.set_cursor(self.state.cursor + 1);
                self.vi_enter_insert(InsertMode::Insert);
            }
            EditAction::ViAppendAtEol => {
                self.state.cursor = self.state.len();
                self.vi_enter_insert(InsertMode::Insert);
            }
            EditAction::ViReplaceChar => self.vi_replace_char(char_arg, count)?,
            EditAction::ViForwardChangeChar => {
                let cursor = self.state.cursor;
                self.vi_change(cursor..cursor + count);
            }
            EditAction::ViBackwardChangeChar => {
                let cursor = self.state.cursor;
                self.vi_change(cursor.saturating_sub(count)..cursor);
            }
            EditAction::ViForwardChangeWord => {
                let cursor = self.state.cursor;
                self.vi_change(cursor..self.state.vi_word_end(cursor, count));
            }
            EditAction::ViBackwardChangeWord => {
                let cursor = self.state.cursor;
                self.vi_change(self.state.vi_previous_word_start(cursor, count)..cursor);
            }
            EditAction::ViChangeRestOfLine => self.vi_change(self.state.cursor..self.state.len()),
            EditAction::ViChangeLine => self.vi_change(0..self.state.len()),
            EditAction::ViChangeToBol => self.vi_change(0..self.state.cursor),
            EditAction::ViUndo => {
                self.state.swap_with_undo();
                self.clamp_cursor();
            }
            EditAction::ViRepeatChange => self.vi_repeat_change(&args)?,
        }

        self.clamp_cursor();
        Ok(Flow::Continue)
    }
}
