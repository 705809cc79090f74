// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{editor_with, line, rang_bell, read_one};
use crate::EditMode;
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test_case(b"hello\x1bx\r", "hell" ; "escape steps back onto the last character")]
#[test_case(b"hello\x1bxu\r", "hello" ; "undo a deletion")]
#[test_case(b"ab\x1bAcd\x1bu\r", "ab" ; "undo an insertion")]
#[test_case(b"abcdef\x1b03x\r", "def" ; "count before a command")]
#[test_case(b"foo bar\x1b0dw\r", "bar" ; "delete word")]
#[test_case(b"foo bar\x1b0D\r", "" ; "delete to end of line")]
#[test_case(b"abc\x1b0rX\r", "Xbc" ; "replace one character")]
#[test_case(b"abc\x1b02rX\r", "XXc" ; "replace with a count")]
#[test_case(b"a,b,c\x1b0f,;x\r", "a,bc" ; "find and repeat find")]
#[test_case(b"a,b,c\x1b0f,f,,x\r", "ab,c" ; "inverted repeat find")]
#[test_case(b"abc\x1b0ix\x1b$aY\r", "xabcY" ; "insert and append")]
#[test_case(b"abc\x1bIx\r", "xabc" ; "insert at beginning of line")]
#[test_case(b"foo bar\x1b0cwbaz\r", "baz bar" ; "change word")]
#[test_case(b"foo bar\x1bccnew\r", "new" ; "change line")]
#[test_case(b"hello\x1b0~~\r", "HEllo" ; "change case")]
#[test_case(b"foo bar\x1b0wD0P\r", "barfoo " ; "put the cut text back")]
fn test_vi_editing(input: &[u8], expected: &str) {
    let (event, _) = read_one(EditMode::Vi, input);
    assert_eq!(event, line(expected));
}

#[test]
fn test_repeat_last_change() {
    let (event, _) = read_one(EditMode::Vi, b"foo bar baz\x1b0cwabc\x1bw.\r");
    assert_eq!(event, line("abc abc baz"));
}

#[test]
fn test_repeat_deletion_with_new_count() {
    let (event, _) = read_one(EditMode::Vi, b"abcdefgh\x1b0x2.\r");
    assert_eq!(event, line("defgh"));
}

#[test]
fn test_repeat_without_change_rings_bell() {
    let (event, stdout_mock) = read_one(EditMode::Vi, b"abc\x1b.\r");
    assert_eq!(event, line("abc"));
    assert!(rang_bell(&stdout_mock));
}

#[test]
fn test_cursor_stays_on_last_character_in_command_mode() {
    let (mut editor, _) = editor_with(EditMode::Vi, b"abc\x1b$l");
    // The script runs out and the read returns the line.
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("abc"));
    assert_eq!(editor.cursor(), 2);
}

#[test]
fn test_switch_to_emacs_mode() {
    let (mut editor, _) = editor_with(EditMode::Vi, b"abc\x18\x05\x01X\r");
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("Xabc"));
    assert_eq!(editor.edit_mode(), EditMode::Emacs);
}
