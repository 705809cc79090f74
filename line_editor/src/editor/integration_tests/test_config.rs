// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{editor_with, line, push_input, rang_bell};
use crate::{EditAction, EditMode, LineEditorError};
use pretty_assertions::assert_eq;
use std::io::Write;

#[test]
fn test_config_report_counts_lines_and_errors() {
    let (mut editor, _) = editor_with(EditMode::Emacs, b"");
    let text = "\
# Bindings for the test.
bind ^G kill-line
frobnicate now
bind ^O no-such-action
edit-mode vi
nobeep
";
    let report = editor.load_config_str("inline", text);
    assert_eq!(report.source_name, "inline");
    assert_eq!(report.applied, 3);
    assert!(!report.is_clean());

    let failed_lines: Vec<usize> = report
        .errors
        .iter()
        .map(|error| match error {
            LineEditorError::ConfigurationSyntax { line_number, .. } => *line_number,
            other => panic!("unexpected error {other:?}"),
        })
        .collect();
    assert_eq!(failed_lines, vec![3, 4]);
    assert!(report.errors[1].to_string().contains("no-such-action"));

    assert_eq!(editor.edit_mode(), EditMode::Vi);
    assert!(!editor.config().bell_enabled);
    let user_binding = editor
        .list_bindings()
        .find(|entry| entry.sequence.as_bytes() == [0x07])
        .and_then(|entry| entry.user);
    assert_eq!(user_binding, Some(EditAction::KillLine));
}

#[test]
fn test_user_bindings_survive_mode_switch() {
    let (mut editor, _) = editor_with(EditMode::Emacs, b"abc\x1b0i\x07\r");
    let report = editor.load_config_str("inline", "bind ^G kill-line\nedit-mode vi\n");
    assert!(report.is_clean());
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line(""));
}

#[test]
fn test_unbinding_restores_default() {
    let (mut editor, stdout_mock) = editor_with(EditMode::Emacs, b"ab\x07\r");
    let report = editor.load_config_str("inline", "bind ^G end-of-line\nbind ^G\n");
    assert!(report.is_clean());
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("ab"));
    // Back to ring-bell.
    assert!(rang_bell(&stdout_mock));
}

#[test]
fn test_load_config_file_and_reload() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "bind ^G beginning-of-line").unwrap();
    file.flush().unwrap();

    let (mut editor, _) = editor_with(EditMode::Emacs, b"");
    let report = editor.load_config_file(file.path()).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.applied, 1);

    // ^X^R re-reads the file.
    writeln!(file, "bind ^O end-of-line").unwrap();
    file.flush().unwrap();
    push_input(&mut editor, b"abc\x07X\x18\x12\x0fY\r");
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("XabcY"));
}

#[test]
fn test_missing_config_file_is_io_error() {
    let (mut editor, _) = editor_with(EditMode::Emacs, b"");
    let result = editor.load_config_file("/nonexistent/dir/teclarc");
    assert!(matches!(result, Err(LineEditorError::Io { .. })));
}

#[test]
fn test_bad_edit_mode_is_reported() {
    let (mut editor, _) = editor_with(EditMode::Emacs, b"");
    let report = editor.load_config_str("inline", "edit-mode ed\nnobeep extra\n");
    assert_eq!(report.applied, 0);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(editor.edit_mode(), EditMode::Emacs);
}
