// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! End to end tests that drive a [`crate::LineEditor`] with scripted or fd input and
//! capture what it draws in a [`crate::StdoutMock`].

// Attach sources.
mod test_completion;
mod test_config;
mod test_emacs_editing;
mod test_fd_input;
mod test_history;
mod test_incremental;
mod test_signals;
mod test_vi_editing;

use crate::{EditMode, InputDevice, LineEditor, LineEditorConfig, ReadLineEvent, Size,
            StdoutMock};

pub const BELL: u8 = 0x07;

pub fn test_config(mode: EditMode) -> LineEditorConfig {
    LineEditorConfig {
        edit_mode: mode,
        term_type: Some("ansi".to_owned()),
        terminal_size: Some(Size::new(80, 24)),
        ..Default::default()
    }
}

pub fn editor_with_input(mode: EditMode, input: InputDevice) -> (LineEditor, StdoutMock) {
    let stdout_mock = StdoutMock::new();
    let editor =
        LineEditor::new_with_io(test_config(mode), input, Box::new(stdout_mock.clone()))
            .unwrap();
    (editor, stdout_mock)
}

/// An editor that reads `input` and then hits end of input.
pub fn editor_with(mode: EditMode, input: &[u8]) -> (LineEditor, StdoutMock) {
    editor_with_input(mode, InputDevice::new_mock_bytes(input))
}

/// Reads one line from `input` and returns it along with the captured output.
pub fn read_one(mode: EditMode, input: &[u8]) -> (ReadLineEvent, StdoutMock) {
    let (mut editor, stdout_mock) = editor_with(mode, input);
    let event = editor.read_line("> ", None, None).unwrap();
    (event, stdout_mock)
}

pub fn line(text: &str) -> ReadLineEvent { ReadLineEvent::Line(text.to_owned()) }

pub fn rang_bell(stdout_mock: &StdoutMock) -> bool {
    stdout_mock.get_copy_of_buffer().contains(&BELL)
}

/// Feeds more scripted input to a mock editor.
pub fn push_input(editor: &mut LineEditor, bytes: &[u8]) {
    if let InputDevice::Mock(script) = &mut editor.input {
        script.push_bytes(bytes);
    }
}
