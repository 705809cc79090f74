// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Turns input bytes into key sequences and key sequences into actions.
//!
//! Bytes accumulate in [`crate::EditorState::key_sequence`] until the binding table
//! resolves them. Live input is encoded the same way binding strings are: a printable
//! first byte gets the `\` marker, a byte with the high bit set is split into `ESC`
//! plus the low seven bits, and in vi command mode an implicit `ESC` goes in front of
//! every key.

use super::{ActionArgs, Flow};
use crate::{ESC, EditAction, KeyBindingEntry, KeyLookup, LineEditor, LineEditorError,
            MAX_KEY_SEQUENCE_LEN, PRINTABLE_MARKER, is_meta_byte, is_printable_byte};

const DEBUG_INGEST: bool = false;

impl LineEditor {
    /// Feeds one input byte through the editor.
    pub(crate) fn process_byte(&mut self, byte: u8) -> Result<Flow, LineEditorError> {
        if let Some(pending) = self.state.pending_argument.take() {
            let args = ActionArgs {
                count: pending.count,
                explicit_count: pending.explicit_count,
                key: byte,
                char_arg: Some(byte),
            };
            return self.dispatch(pending.action, args, pending.from_command_mode);
        }

        if self.state.numeric_argument.is_active()
            && byte.is_ascii_digit()
            && self.state.key_sequence.is_empty()
        {
            self.state.numeric_argument.fold_digit(byte);
            return Ok(Flow::Continue);
        }

        if is_meta_byte(byte) {
            let flow = self.ingest(ESC)?;
            if flow != Flow::Continue {
                return Ok(flow);
            }
            return self.ingest(byte & 0x7f);
        }

        self.ingest(byte)
    }

    fn ingest(&mut self, byte: u8) -> Result<Flow, LineEditorError> {
        let from_command_mode = self.state.in_vi_command_mode();
        let sequence = &mut self.state.key_sequence;
        if sequence.is_empty() {
            if from_command_mode && byte != ESC {
                sequence.push(ESC);
            } else if is_printable_byte(byte) {
                sequence.push(PRINTABLE_MARKER);
            }
        }
        sequence.push(byte);

        let lookup = self.table.lookup(self.state.key_sequence.as_bytes());
        DEBUG_INGEST.then(|| {
            tracing::debug!(message = "ingest", sequence = %self.state.key_sequence, ?lookup);
        });

        match lookup {
            KeyLookup::Exact(index) => {
                self.state.key_sequence.clear();
                let Some(action) = self
                    .table
                    .entry(index)
                    .and_then(KeyBindingEntry::effective_action)
                else {
                    self.state.numeric_argument.clear();
                    self.ring_bell()?;
                    return Ok(Flow::Continue);
                };

                // A digit extends the argument instead of consuming it.
                let args = if action == EditAction::DigitArgument {
                    ActionArgs::new(1, false, byte)
                } else {
                    let count = self.state.numeric_argument.take();
                    ActionArgs::new(count.unwrap_or(1), count.is_some(), byte)
                };
                self.dispatch(action, args, from_command_mode)
            }

            KeyLookup::Ambiguous(_) => {
                if self.state.key_sequence.len() >= MAX_KEY_SEQUENCE_LEN {
                    self.state.key_sequence.clear();
                    self.state.numeric_argument.clear();
                    self.ring_bell()?;
                }
                Ok(Flow::Continue)
            }

            KeyLookup::None(_) => {
                let sequence = std::mem::take(&mut self.state.key_sequence);
                let count = self.state.numeric_argument.take().unwrap_or(1);
                if !sequence.is_printable_leading() {
                    self.ring_bell()?;
                    return Ok(Flow::Continue);
                }
                // Only the first key inserts itself. The keys after it start over.
                let bytes = sequence.as_bytes();
                self.self_insert(&bytes[1..2], count)?;
                for &byte in &bytes[2..] {
                    let flow = self.process_byte(byte)?;
                    if flow != Flow::Continue {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Continue)
            }
        }
    }

    /// Inserts unbound printable input `count` times.
    fn self_insert(&mut self, bytes: &[u8], count: usize) -> Result<(), LineEditorError> {
        self.end_history_browse();
        self.state.begin_action();
        for _ in 0..count {
            if self.state.insert_bytes(bytes) < bytes.len() {
                return self.ring_bell();
            }
        }
        Ok(())
    }
}
