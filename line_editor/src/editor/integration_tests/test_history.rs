// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{editor_with, line, push_input, rang_bell};
use crate::{EditMode, InMemoryHistory, LineEditor, ReadLineEvent, StdoutMock};
use pretty_assertions::assert_eq;

/// An emacs editor that has already read `lines`.
fn editor_with_history(lines: &[&str]) -> (LineEditor, StdoutMock) {
    let (mut editor, stdout_mock) = editor_with(EditMode::Emacs, b"");
    for it in lines {
        push_input(&mut editor, it.as_bytes());
        push_input(&mut editor, b"\r");
        assert_eq!(editor.read_line("> ", None, None).unwrap(), line(it));
    }
    stdout_mock.clear();
    (editor, stdout_mock)
}

fn read_next(editor: &mut LineEditor, input: &[u8]) -> ReadLineEvent {
    push_input(editor, input);
    editor.read_line("> ", None, None).unwrap()
}

#[test]
fn test_up_and_down_walk_history() {
    let (mut editor, _) = editor_with_history(&["first", "second"]);
    // A repeat of the newest line is not archived again.
    assert_eq!(read_next(&mut editor, b"\x10\r"), line("second"));
    assert_eq!(read_next(&mut editor, b"\x10\x10\x0e\r"), line("second"));
}

#[test]
fn test_up_past_oldest_rings_bell_and_keeps_line() {
    let (mut editor, stdout_mock) = editor_with_history(&["first", "second"]);
    assert_eq!(read_next(&mut editor, b"\x10\x10\x10\r"), line("first"));
    assert!(rang_bell(&stdout_mock));
}

#[test]
fn test_down_past_newest_restores_draft() {
    let (mut editor, _) = editor_with_history(&["first"]);
    assert_eq!(read_next(&mut editor, b"draft\x10\x0e\r"), line("draft"));
}

#[test]
fn test_up_on_empty_history_rings_bell() {
    let (mut editor, stdout_mock) = editor_with(EditMode::Emacs, b"\x10x\r");
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("x"));
    assert!(rang_bell(&stdout_mock));
}

#[test]
fn test_arrow_keys_recall() {
    let (mut editor, _) = editor_with_history(&["first"]);
    assert_eq!(read_next(&mut editor, b"\x1b[A\r"), line("first"));
}

#[test]
fn test_prefix_search() {
    let (mut editor, _) = editor_with_history(&["git status", "ls", "git log"]);
    assert_eq!(read_next(&mut editor, b"git\x1bp\r"), line("git log"));
    assert_eq!(read_next(&mut editor, b"git\x1bp\x1bp\x1bp\r"), line("git status"));
}

#[test]
fn test_beginning_and_end_of_history() {
    let (mut editor, _) = editor_with_history(&["one", "two", "three"]);
    assert_eq!(read_next(&mut editor, b"\x1b<\r"), line("one"));
    assert_eq!(read_next(&mut editor, b"draft\x1b<\x1b>\r"), line("draft"));
}

#[test]
fn test_editing_ends_recall() {
    let (mut editor, _) = editor_with_history(&["one", "two"]);
    // Typing after a recall edits the recalled line, the next ^P starts over at the
    // newest entry.
    assert_eq!(read_next(&mut editor, b"\x10!\r"), line("two!"));
    assert_eq!(read_next(&mut editor, b"\x10\r"), line("two!"));
}

#[test]
fn test_custom_history_store() {
    let (mut editor, _) = editor_with(EditMode::Vi, b"");
    let mut history = InMemoryHistory::new(2);
    history.entries.extend(
        ["a", "b", "c"].into_iter().map(|it| crate::HistoryEntry {
            line: it.to_owned(),
            group_id: 0,
        }),
    );
    editor.set_history(history);
    // k recalls in vi command mode.
    assert_eq!(read_next(&mut editor, b"\x1bkk\r"), line("b"));
}
