// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{editor_with, line, rang_bell, read_one};
use crate::{EditMode, LineEditorConfig, ReadLineEvent, InputDevice, LineEditor, StdoutMock};
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test]
fn test_plain_line_and_prompt() {
    let (event, stdout_mock) = read_one(EditMode::Emacs, b"hello\r");
    assert_eq!(event, line("hello"));
    assert!(
        stdout_mock
            .get_copy_of_buffer_as_string_strip_ansi()
            .contains("> hello")
    );
}

#[test]
fn test_eof_on_empty_line() {
    let (event, _) = read_one(EditMode::Emacs, b"");
    assert_eq!(event, ReadLineEvent::Eof);

    let (event, _) = read_one(EditMode::Emacs, b"\x04");
    assert_eq!(event, ReadLineEvent::Eof);
}

#[test]
fn test_eof_with_text_returns_the_line() {
    let (event, _) = read_one(EditMode::Emacs, b"abc");
    assert_eq!(event, line("abc"));
}

#[test_case(b"world\x01hello \r", "hello world" ; "beginning of line then insert")]
#[test_case(b"hello world\x01\x1bf\x0b\r", "hello" ; "forward word then kill line")]
#[test_case(b"hello world\x1b\x7f\x01\x19\r", "worldhello " ; "backward delete word then yank")]
#[test_case(b"ab\x14\r", "ba" ; "transpose at end of line")]
#[test_case(b"foo bar\x01\x1bu\r", "FOO bar" ; "upcase word")]
#[test_case(b"foo bar\x01\x1bc\r", "Foo bar" ; "capitalize word")]
#[test_case(b"\x1b3x\r", "xxx" ; "numeric argument repeats insertion")]
#[test_case(b"abcd\x1b2\x02X\r", "abXcd" ; "numeric argument repeats motion")]
#[test_case(b"abc\x08\x08d\r", "ad" ; "backspace")]
#[test_case(b"abc\x01\x04\r", "bc" ; "delete char under cursor")]
#[test_case(b"abc\x15xyz\r", "xyz" ; "kill to beginning of line")]
#[test_case(b"one two\x01\x00\x05\x17\x19\x19\r", "one twoone two" ; "kill region and yank twice")]
#[test_case(b"x\x16\x01\r", "x\x01" ; "literal next inserts a control character")]
fn test_emacs_editing(input: &[u8], expected: &str) {
    let (event, _) = read_one(EditMode::Emacs, input);
    assert_eq!(event, line(expected));
}

#[test]
fn test_unbound_sequence_rings_bell() {
    let (event, stdout_mock) = read_one(EditMode::Emacs, b"a\x18zb\r");
    assert_eq!(event, line("ab"));
    assert!(rang_bell(&stdout_mock));
}

#[test]
fn test_bell_can_be_disabled() {
    let (mut editor, stdout_mock) = editor_with(EditMode::Emacs, b"a\x18zb\r");
    editor.set_bell_enabled(false);
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("ab"));
    assert!(!rang_bell(&stdout_mock));
}

#[test]
fn test_full_buffer_rings_bell_and_keeps_prefix() {
    let stdout_mock = StdoutMock::new();
    let config = LineEditorConfig {
        buffer_capacity: 4,
        ..super::test_config(EditMode::Emacs)
    };
    let mut editor = LineEditor::new_with_io(
        config,
        InputDevice::new_mock_bytes(b"abcdef\r"),
        Box::new(stdout_mock.clone()),
    )
    .unwrap();
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("abcd"));
    assert!(super::rang_bell(&stdout_mock));
}

#[test]
fn test_seed_and_cursor() {
    let (mut editor, _) = editor_with(EditMode::Emacs, b"X\r");
    let event = editor.read_line("> ", Some("abc"), Some(1)).unwrap();
    assert_eq!(event, line("aXbc"));
}

#[test]
fn test_user_binding_overrides_default() {
    let (mut editor, _) = editor_with(EditMode::Emacs, b"abc\x07\x01Z\r");
    editor.bind("^G", Some("end-of-line")).unwrap();
    // ^G moves to the end of line, ^A back to the start.
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("Zabc"));
}

#[test]
fn test_unfinished_printable_binding_replays_the_keys_after_the_first() {
    // `a` waits for `b`, then ^A doesn't complete it: `a` is inserted and ^A still
    // moves to the start of the line.
    let (mut editor, _) = editor_with(EditMode::Emacs, b"xa\x01Y\r");
    editor.bind("ab", Some("end-of-line")).unwrap();
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("Yxa"));
}

#[test]
fn test_rebinding_arrow_key_by_name() {
    let (mut editor, _) = editor_with(EditMode::Emacs, b"abc\x1b[AX\r");
    editor.bind("up", Some("beginning-of-line")).unwrap();
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("Xabc"));
}

#[test]
fn test_bind_errors() {
    let (mut editor, _) = editor_with(EditMode::Emacs, b"");
    assert!(matches!(
        editor.bind("^O", Some("no-such-action")),
        Err(crate::LineEditorError::UnknownAction { .. })
    ));
    assert!(matches!(
        editor.bind("^X", Some("kill-line")),
        Err(crate::LineEditorError::BindingConflict { .. })
    ));
}

#[test]
fn test_switch_to_vi_mode_with_key() {
    // ^X^V switches to vi insert mode, ESC then enters command mode where 0 is
    // beginning-of-line.
    let (mut editor, _) = editor_with(EditMode::Emacs, b"abc\x18\x16\x1b0iX\r");
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("Xabc"));
    assert_eq!(editor.edit_mode(), EditMode::Vi);
}
