// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{CrlfWriter, LineEditor, LineEditorError, list_completions};

/// The parts of a completion result that the editor acts on.
#[derive(Debug)]
struct CompletionSummary {
    suffix: String,
    cont_suffix: String,
    match_count: usize,
}

impl LineEditor {
    /// Runs the completer on the text left of the cursor. `None` means there was
    /// nothing to complete, or the completer failed (the bell was rung either way).
    fn run_completer(&mut self) -> Result<Option<CompletionSummary>, LineEditorError> {
        let cursor = self.state.cursor;
        let outcome = match std::str::from_utf8(self.state.line()) {
            Ok(line) if line.is_char_boundary(cursor) => Some(
                self.completion
                    .complete(line, cursor, &mut *self.completer)
                    .map(|result| CompletionSummary {
                        suffix: result.suffix.clone(),
                        cont_suffix: result.cont_suffix.clone(),
                        match_count: result.matches.len(),
                    }),
            ),
            _ => None,
        };
        let Some(outcome) = outcome else {
            self.ring_bell()?;
            return Ok(None);
        };

        match outcome {
            Ok(summary) if summary.match_count > 0 => Ok(Some(summary)),
            Ok(_) => {
                self.ring_bell()?;
                Ok(None)
            }
            Err(error) => {
                tracing::warn!(message = "Completion callback failed", %error);
                self.ring_bell()?;
                Ok(None)
            }
        }
    }

    /// Inserts the common suffix. A unique match also gets its continuation suffix
    /// (eg: a space or `/`). Several matches with nothing in common are listed.
    pub(super) fn complete_word(&mut self) -> Result<(), LineEditorError> {
        let Some(summary) = self.run_completer()? else {
            return Ok(());
        };

        let mut insertion = summary.suffix.into_bytes();
        if summary.match_count == 1 {
            insertion.extend_from_slice(summary.cont_suffix.as_bytes());
        }
        if !insertion.is_empty() && self.state.insert_bytes(&insertion) < insertion.len() {
            self.ring_bell()?;
        }

        if summary.match_count > 1 && insertion.is_empty() {
            self.show_completion_list()?;
        }
        Ok(())
    }

    pub(super) fn list_matches(&mut self) -> Result<(), LineEditorError> {
        if self.run_completer()?.is_some() {
            self.show_completion_list()?;
        }
        Ok(())
    }

    /// Prints the last result below the line. The next refresh redraws the prompt and
    /// the line underneath the list.
    fn show_completion_list(&mut self) -> Result<(), LineEditorError> {
        self.renderer
            .finish_line(&mut *self.output)
            .map_err(LineEditorError::io("writing to the terminal"))?;
        let width = self.renderer.size.width();
        let mut writer = CrlfWriter::new(&mut *self.output);
        list_completions(self.completion.result(), &mut writer, width)
            .map_err(LineEditorError::io("writing the completion list"))
    }
}
