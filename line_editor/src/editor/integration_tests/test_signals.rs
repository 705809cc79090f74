// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{editor_with_input, line, test_config};
use crate::{AfterSignal, EditMode, InputDevice, InputEvent, LineEditor, LineEditorConfig,
            LineEditorError, SessionClaim, SignalFlags, StdoutMock};
use libc::{SIGINT, SIGUSR1, SIGUSR2, SIGWINCH};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::{io::Write,
          os::unix::net::UnixStream,
          sync::atomic::{AtomicUsize, Ordering},
          thread,
          time::Duration};

fn scripted(bytes: &[u8], then: InputEvent) -> InputDevice {
    let mut events: Vec<InputEvent> = bytes.iter().copied().map(InputEvent::Byte).collect();
    events.push(then);
    InputDevice::new_mock(events)
}

#[test]
fn test_aborting_signal_keeps_partial_line() {
    let (mut editor, _) = editor_with_input(EditMode::Emacs, scripted(b"ab", InputEvent::Signal(SIGINT)));
    let result = editor.read_line("> ", None, None);
    assert!(matches!(result, Err(LineEditorError::SignalAbort { signal }) if signal == SIGINT));
    assert_eq!(editor.line(), "ab");
}

#[test]
fn test_interrupt_key_aborts() {
    let (mut editor, _) = editor_with_input(EditMode::Emacs, InputDevice::new_mock_bytes(b"ab\x03"));
    let result = editor.read_line("> ", None, None);
    assert!(matches!(result, Err(LineEditorError::SignalAbort { signal }) if signal == SIGINT));
}

#[test]
fn test_editor_is_usable_after_abort() {
    let (mut editor, _) = editor_with_input(EditMode::Emacs, scripted(b"ab", InputEvent::Signal(SIGINT)));
    assert!(editor.read_line("> ", None, None).is_err());
    super::push_input(&mut editor, b"cd\r");
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("cd"));
}

#[test]
fn test_abort_drops_a_half_typed_key_sequence() {
    let (mut editor, _) =
        editor_with_input(EditMode::Emacs, scripted(b"ab\x1b[", InputEvent::Signal(SIGINT)));
    assert!(editor.read_line("> ", None, None).is_err());
    assert_eq!(editor.line(), "ab");

    // A stale `ESC [` would turn this into the up arrow.
    super::push_input(&mut editor, b"A\r");
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("A"));
}

#[test]
fn test_abort_drops_a_pending_vi_char_argument() {
    let (mut editor, _) =
        editor_with_input(EditMode::Vi, scripted(b"abc\x1b0f", InputEvent::Signal(SIGINT)));
    assert!(editor.read_line("> ", None, None).is_err());
    assert_eq!(editor.line(), "abc");

    super::push_input(&mut editor, b"x\r");
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("x"));
}

#[test]
fn test_resize_resumes_editing() {
    let mut events: Vec<InputEvent> = b"ab".iter().copied().map(InputEvent::Byte).collect();
    events.push(InputEvent::Signal(SIGWINCH));
    events.extend(b"c\r".iter().copied().map(InputEvent::Byte));
    let (mut editor, _) = editor_with_input(EditMode::Emacs, InputDevice::new_mock(events));
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("abc"));
}

#[test]
fn test_trap_can_return_the_line() {
    let (mut editor, _) = editor_with_input(EditMode::Emacs, scripted(b"ab", InputEvent::Signal(SIGUSR1)));
    editor
        .trap_signal(SIGUSR1, SignalFlags::RESTORE_LINE, AfterSignal::ReturnLine)
        .unwrap();
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("ab"));
}

#[test]
fn test_trap_table_changes() {
    let (mut editor, _) = editor_with_input(EditMode::Emacs, InputDevice::new_mock_bytes(b""));
    assert_eq!(editor.signal_traps().len(), 17);
    assert!(editor.untrap_signal(SIGINT));
    assert!(!editor.untrap_signal(SIGINT));
    editor.clear_signal_traps();
    assert!(editor.signal_traps().is_empty());
}

/// An editor reading from a socket, with signal trapping on.
fn trapping_editor(reader: UnixStream) -> (LineEditor, StdoutMock) {
    let stdout_mock = StdoutMock::new();
    let config = LineEditorConfig {
        trap_signals: true,
        ..test_config(EditMode::Emacs)
    };
    let editor = LineEditor::new_with_io(
        config,
        InputDevice::from_fd(reader),
        Box::new(stdout_mock.clone()),
    )
    .unwrap();
    (editor, stdout_mock)
}

#[serial]
#[test]
fn test_real_signal_interrupts_the_wait() {
    let (reader, mut writer) = UnixStream::pair().unwrap();
    let (mut editor, _) = trapping_editor(reader);
    editor.clear_signal_traps();
    editor
        .trap_signal(SIGUSR1, SignalFlags::DONT_FORWARD, AfterSignal::Abort)
        .unwrap();

    let sender = thread::spawn(move || {
        writer.write_all(b"ab").unwrap();
        thread::sleep(Duration::from_millis(200));
        signal_hook::low_level::raise(SIGUSR1).unwrap();
        writer
    });
    let result = editor.read_line("> ", None, None);
    drop(sender.join().unwrap());

    assert!(matches!(result, Err(LineEditorError::SignalAbort { signal }) if signal == SIGUSR1));
    assert_eq!(editor.line(), "ab");
}

#[serial]
#[test]
fn test_only_one_trapping_session_at_a_time() {
    let (reader, _writer) = UnixStream::pair().unwrap();
    let (mut editor, _) = trapping_editor(reader);

    let claim = SessionClaim::try_claim().unwrap();
    assert!(matches!(
        editor.read_line("> ", None, None),
        Err(LineEditorError::SessionAlreadyActive)
    ));
    drop(claim);
    assert!(SessionClaim::try_claim().is_ok());
}

static HANDLER_THREAD: AtomicUsize = AtomicUsize::new(0);

extern "C" fn record_handler_thread(_: libc::c_int) {
    HANDLER_THREAD.store(unsafe { libc::pthread_self() } as usize, Ordering::SeqCst);
}

#[serial]
#[test]
fn test_host_handler_runs_in_the_reading_thread_after_the_line_is_moved_aside() {
    unsafe { libc::signal(SIGUSR2, record_handler_thread as *const () as libc::sighandler_t) };
    HANDLER_THREAD.store(0, Ordering::SeqCst);
    let reading_thread = unsafe { libc::pthread_self() } as usize;

    let (reader, mut writer) = UnixStream::pair().unwrap();
    let (mut editor, stdout_mock) = trapping_editor(reader);
    editor.clear_signal_traps();
    editor
        .trap_signal(
            SIGUSR2,
            SignalFlags::RESTORE_TERMINAL | SignalFlags::RESTORE_LINE | SignalFlags::REDRAW_LINE,
            AfterSignal::Resume,
        )
        .unwrap();

    // Raised in the sender thread: a handler chained on arrival would run there.
    let sender = thread::spawn(move || {
        writer.write_all(b"ab").unwrap();
        thread::sleep(Duration::from_millis(200));
        signal_hook::low_level::raise(SIGUSR2).unwrap();
        thread::sleep(Duration::from_millis(200));
        writer.write_all(b"c\r").unwrap();
        writer
    });
    let result = editor.read_line("> ", None, None);
    drop(sender.join().unwrap());
    unsafe { libc::signal(SIGUSR2, libc::SIG_DFL) };

    assert_eq!(result.unwrap(), line("abc"));
    assert_eq!(HANDLER_THREAD.load(Ordering::SeqCst), reading_thread);
    // Moved aside, then drawn again on resume.
    let output = stdout_mock.get_copy_of_buffer_as_string_strip_ansi();
    assert!(output.matches("> ").count() >= 2, "{output:?}");
}
