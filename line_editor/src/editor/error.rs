// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{KeySequenceParseError, KeyTableError};
use std::{io, os::fd::RawFd};

/// Everything that can go wrong while configuring the editor or reading a line.
///
/// A failed read call never corrupts the binding table or the edit buffer, and the
/// [`crate::LineEditor`] stays usable for the next call.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum LineEditorError {
    #[error("out of memory while growing the {what}")]
    #[diagnostic(
        code(r3bl_line_editor::allocation_failure),
        help("The previous state was kept, the operation was not applied")
    )]
    AllocationFailure { what: &'static str },

    #[error("{source_name}:{line_number}: {message}")]
    #[diagnostic(
        code(r3bl_line_editor::configuration_syntax),
        help("Directives are `bind <keyseq> [action]`, `edit-mode emacs|vi|none`, and `nobeep`")
    )]
    ConfigurationSyntax {
        source_name: String,
        line_number: usize,
        message: String,
    },

    #[error("can't bind {sequence} because it is a prefix of {count} longer binding(s)")]
    #[diagnostic(
        code(r3bl_line_editor::binding_conflict),
        help("Unbind the longer sequences first")
    )]
    BindingConflict { sequence: String, count: usize },

    #[error("invalid key sequence {spec:?}")]
    #[diagnostic(code(r3bl_line_editor::invalid_key_sequence))]
    InvalidKeySequence {
        spec: String,
        #[source]
        source: KeySequenceParseError,
    },

    #[error("unknown action {name:?}")]
    #[diagnostic(
        code(r3bl_line_editor::unknown_action),
        help("Action names are kebab-case, eg: backward-delete-char")
    )]
    UnknownAction { name: String },

    #[error("{context}")]
    #[diagnostic(code(r3bl_line_editor::io))]
    Io {
        context: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("line read aborted by signal {signal}")]
    #[diagnostic(
        code(r3bl_line_editor::signal_abort),
        help("Use LineEditor::trap_signal to choose a different disposition")
    )]
    SignalAbort { signal: i32 },

    #[error("line read aborted by the callback watching fd {fd}")]
    #[diagnostic(code(r3bl_line_editor::fd_callback_abort))]
    FdCallbackAbort { fd: RawFd },

    #[error("another signal trapping read session is already active in this process")]
    #[diagnostic(
        code(r3bl_line_editor::session_already_active),
        help("Only one LineEditor at a time can trap signals, disable trap_signals on the others")
    )]
    SessionAlreadyActive,
}

impl LineEditorError {
    pub fn io(context: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Io { context, source }
    }
}

impl From<KeyTableError> for LineEditorError {
    fn from(error: KeyTableError) -> Self {
        match error {
            KeyTableError::WouldShadow { sequence, count } => {
                Self::BindingConflict { sequence, count }
            }
            KeyTableError::AllocationFailure => Self::AllocationFailure {
                what: "key binding table",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_errors_convert() {
        let error: LineEditorError = KeyTableError::WouldShadow {
            sequence: "^X".into(),
            count: 2,
        }
        .into();
        assert!(matches!(error, LineEditorError::BindingConflict { count: 2, .. }));
        assert_eq!(
            error.to_string(),
            "can't bind ^X because it is a prefix of 2 longer binding(s)"
        );
    }

    #[test]
    fn test_io_context() {
        let error = LineEditorError::io("reading the terminal")(io::Error::other("boom"));
        assert_eq!(error.to_string(), "reading the terminal");
    }
}
