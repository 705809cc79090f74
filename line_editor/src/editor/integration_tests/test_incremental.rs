// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{editor_with, test_config};
use crate::{EditMode, IncrementalReadEvent, InputDevice, LineEditor, LineEditorConfig,
            LineEditorError, StdoutMock};
use pretty_assertions::assert_eq;

fn feed(editor: &mut LineEditor, bytes: &[u8]) -> Vec<IncrementalReadEvent> {
    bytes
        .iter()
        .map(|byte| {
            editor
                .read_line_incremental("> ", None, None, Some(*byte))
                .unwrap()
        })
        .collect()
}

fn network_editor(archive: bool) -> (LineEditor, StdoutMock) {
    let stdout_mock = StdoutMock::new();
    let config = LineEditorConfig {
        archive_network_history: archive,
        ..test_config(EditMode::Emacs)
    };
    let editor =
        LineEditor::new_with_io(config, InputDevice::new_mock_bytes(b""), Box::new(stdout_mock.clone()))
            .unwrap();
    (editor, stdout_mock)
}

#[test]
fn test_line_arrives_byte_by_byte() {
    let (mut editor, stdout_mock) = editor_with(EditMode::Emacs, b"");
    assert!(!editor.is_incremental_line_active());

    assert_eq!(
        editor.read_line_incremental("> ", None, None, None).unwrap(),
        IncrementalReadEvent::Pending
    );
    assert!(editor.is_incremental_line_active());
    assert!(stdout_mock.get_copy_of_buffer_as_string_strip_ansi().contains("> "));

    assert_eq!(
        feed(&mut editor, b"ls"),
        vec![IncrementalReadEvent::Pending, IncrementalReadEvent::Pending]
    );
    assert_eq!(
        feed(&mut editor, b"\r"),
        vec![IncrementalReadEvent::Line("ls".to_owned())]
    );
    assert!(!editor.is_incremental_line_active());
}

#[test]
fn test_first_byte_starts_the_line() {
    let (mut editor, _) = editor_with(EditMode::Emacs, b"");
    let events = feed(&mut editor, b"ab\x02X\r");
    assert_eq!(events.last(), Some(&IncrementalReadEvent::Line("aXb".to_owned())));
}

#[test]
fn test_eof_on_empty_line() {
    let (mut editor, _) = editor_with(EditMode::Emacs, b"");
    assert_eq!(feed(&mut editor, b"\x04"), vec![IncrementalReadEvent::Eof]);
    assert!(!editor.is_incremental_line_active());
}

#[test]
fn test_lines_are_not_archived_by_default() {
    let (mut editor, _) = network_editor(false);
    feed(&mut editor, b"secret\r");
    // ^P finds nothing to recall.
    let events = feed(&mut editor, b"\x10\r");
    assert_eq!(events.last(), Some(&IncrementalReadEvent::Line(String::new())));
}

#[test]
fn test_lines_are_archived_when_enabled() {
    let (mut editor, _) = network_editor(true);
    feed(&mut editor, b"status\r");
    let events = feed(&mut editor, b"\x10\r");
    assert_eq!(events.last(), Some(&IncrementalReadEvent::Line("status".to_owned())));
}

#[test]
fn test_interrupt_key_aborts_the_line() {
    let (mut editor, _) = editor_with(EditMode::Emacs, b"");
    feed(&mut editor, b"abc");
    let result = editor.read_line_incremental("> ", None, None, Some(0x03));
    assert!(matches!(
        result,
        Err(LineEditorError::SignalAbort { signal }) if signal == libc::SIGINT
    ));
    assert!(!editor.is_incremental_line_active());
    assert_eq!(editor.line(), "abc");

    // The next byte starts a fresh line.
    assert_eq!(
        feed(&mut editor, b"x\r"),
        vec![IncrementalReadEvent::Pending, IncrementalReadEvent::Line("x".to_owned())]
    );
}
