// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{editor_with, line, rang_bell};
use crate::{CandidateSink, CompletionError, EditMode, LineEditor, StdoutMock,
            find_word_start};
use pretty_assertions::assert_eq;
use test_case::test_case;

const COMMANDS: [&str; 3] = ["help", "hello", "history"];

fn complete_commands(
    sink: &mut CandidateSink<'_>,
    line: &str,
    word_end: usize,
) -> Result<(), CompletionError> {
    let word_start = find_word_start(line, word_end);
    let word = &line[word_start..word_end];
    for command in COMMANDS {
        if let Some(suffix) = command.strip_prefix(word) {
            sink.add_candidate(line, word_start, word_end, suffix, "", " ")?;
        }
    }
    Ok(())
}

fn editor_with_commands(mode: EditMode, input: &[u8]) -> (LineEditor, StdoutMock) {
    let (mut editor, stdout_mock) = editor_with(mode, input);
    editor.set_completer(complete_commands);
    (editor, stdout_mock)
}

#[test_case(EditMode::Emacs, b"hi\t\r", "history " ; "emacs unique match")]
#[test_case(EditMode::Vi, b"hi\t\r", "history " ; "vi unique match")]
#[test_case(EditMode::Emacs, b"he\t\r", "hel" ; "common prefix of several matches")]
#[test_case(EditMode::Emacs, b"run hi\t\r", "run history " ; "word after other words")]
fn test_complete_word(mode: EditMode, input: &[u8], expected: &str) {
    let (mut editor, _) = editor_with_commands(mode, input);
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line(expected));
}

#[test]
fn test_ambiguous_completion_lists_matches() {
    let (mut editor, stdout_mock) = editor_with_commands(EditMode::Emacs, b"hel\t\r");
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("hel"));

    let output = stdout_mock.get_copy_of_buffer_as_string_strip_ansi();
    assert!(output.contains("hello"));
    assert!(output.contains("help"));
    // The prompt and line are redrawn below the list.
    let listing_end = output.rfind("help").unwrap();
    assert!(output[listing_end..].contains("> hel"));
}

#[test]
fn test_list_matches_at_end_of_line() {
    let (mut editor, stdout_mock) = editor_with_commands(EditMode::Emacs, b"h\x04\r");
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("h"));
    let output = stdout_mock.get_copy_of_buffer_as_string_strip_ansi();
    for command in COMMANDS {
        assert!(output.contains(command));
    }
}

#[test]
fn test_no_match_rings_bell() {
    let (mut editor, stdout_mock) = editor_with_commands(EditMode::Emacs, b"xyz\t\r");
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("xyz"));
    assert!(rang_bell(&stdout_mock));
}

#[test]
fn test_completer_error_is_reported() {
    let (mut editor, stdout_mock) = editor_with(EditMode::Emacs, b"ab\t\r");
    editor.set_completer(
        |_: &mut CandidateSink<'_>, _: &str, _: usize| -> Result<(), CompletionError> {
            Err(CompletionError::callback("backend unavailable"))
        },
    );
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("ab"));
    assert!(rang_bell(&stdout_mock));
    assert!(
        editor
            .completion_engine()
            .last_error()
            .unwrap()
            .contains("backend unavailable")
    );
}

#[test]
fn test_completer_sees_text_left_of_cursor() {
    let seen = std::rc::Rc::new(std::cell::RefCell::new(vec![]));
    let seen_by_completer = seen.clone();
    let (mut editor, _) = editor_with(EditMode::Emacs, b"abc def\x02\x02\t\r");
    editor.set_completer(
        move |_: &mut CandidateSink<'_>, line: &str, word_end: usize| -> Result<(), CompletionError> {
            seen_by_completer.borrow_mut().push((line.to_owned(), word_end));
            Ok(())
        },
    );
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("abc def"));
    assert_eq!(*seen.borrow(), vec![("abc def".to_owned(), 5)]);
}
