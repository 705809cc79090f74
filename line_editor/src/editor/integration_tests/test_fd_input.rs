// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{line, test_config};
use crate::{EditMode, FdCallbackOutcome, FdEventKind, InputDevice, LineEditor,
            LineEditorConfig, LineEditorError, ReadLineEvent, StdoutMock};
use pretty_assertions::assert_eq;
use std::{cell::RefCell,
          io::{Read, Seek, Write},
          os::{fd::{AsRawFd, OwnedFd},
               unix::net::UnixStream},
          rc::Rc,
          thread,
          time::Duration};

/// An editor reading from `fd` without trapping signals, so these tests can run in
/// parallel with the ones that do.
fn fd_editor(fd: impl Into<OwnedFd>) -> (LineEditor, StdoutMock) {
    let stdout_mock = StdoutMock::new();
    let config = LineEditorConfig {
        trap_signals: false,
        ..test_config(EditMode::Emacs)
    };
    let editor = LineEditor::new_with_io(
        config,
        InputDevice::from_fd(fd),
        Box::new(stdout_mock.clone()),
    )
    .unwrap();
    (editor, stdout_mock)
}

#[test]
fn test_socket_input_until_peer_closes() {
    let (reader, mut writer) = UnixStream::pair().unwrap();
    writer.write_all(b"first\rsecond").unwrap();
    drop(writer);

    let (mut editor, _) = fd_editor(reader);
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("first"));
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("second"));
    assert_eq!(editor.read_line("> ", None, None).unwrap(), ReadLineEvent::Eof);
}

#[test]
fn test_input_arriving_in_pieces() {
    let (reader, mut writer) = UnixStream::pair().unwrap();
    let (mut editor, _) = fd_editor(reader);

    let typist = thread::spawn(move || {
        for chunk in [&b"hel"[..], b"lo", b"\r"] {
            writer.write_all(chunk).unwrap();
            thread::sleep(Duration::from_millis(20));
        }
        writer
    });
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("hello"));
    drop(typist.join().unwrap());
}

#[test]
fn test_regular_file_input() {
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(b"hello\nworld").unwrap();
    file.rewind().unwrap();

    // Regular files can't be polled, the editor falls back to blocking reads.
    let (mut editor, _) = fd_editor(file);
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("hello"));
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("world"));
    assert_eq!(editor.read_line("> ", None, None).unwrap(), ReadLineEvent::Eof);
}

#[test]
fn test_host_fd_callback_runs_while_waiting() {
    let (reader, mut writer) = UnixStream::pair().unwrap();
    let (mut host_reader, mut host_writer) = UnixStream::pair().unwrap();
    let host_fd = host_reader.as_raw_fd();
    let (mut editor, stdout_mock) = fd_editor(reader);

    let received = Rc::new(RefCell::new(vec![]));
    let received_by_callback = Rc::clone(&received);
    editor
        .register_fd_interest(host_fd, FdEventKind::Readable, move |_, fd, kind| {
            assert_eq!((fd, kind), (host_fd, FdEventKind::Readable));
            let mut buffer = [0; 64];
            if let Ok(count) = host_reader.read(&mut buffer) {
                received_by_callback
                    .borrow_mut()
                    .extend_from_slice(&buffer[..count]);
            }
            FdCallbackOutcome::Refresh
        })
        .unwrap();

    let peer = thread::spawn(move || {
        host_writer.write_all(b"ping").unwrap();
        thread::sleep(Duration::from_millis(100));
        writer.write_all(b"ok\r").unwrap();
        (writer, host_writer)
    });
    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("ok"));
    drop(peer.join().unwrap());

    assert_eq!(*received.borrow(), b"ping".to_vec());
    // The refresh redrew the prompt.
    let output = stdout_mock.get_copy_of_buffer_as_string_strip_ansi();
    assert!(output.matches("> ").count() >= 2);
}

#[test]
fn test_host_fd_callback_can_abort_the_read() {
    let (reader, _writer) = UnixStream::pair().unwrap();
    let (host_reader, mut host_writer) = UnixStream::pair().unwrap();
    let host_fd = host_reader.as_raw_fd();
    host_writer.write_all(b"x").unwrap();

    let (mut editor, _) = fd_editor(reader);
    editor
        .register_fd_interest(host_fd, FdEventKind::Readable, |_, _, _| {
            FdCallbackOutcome::Abort
        })
        .unwrap();

    let result = editor.read_line("> ", Some("partial"), None);
    assert!(matches!(
        result,
        Err(LineEditorError::FdCallbackAbort { fd }) if fd == host_fd
    ));
    assert_eq!(editor.line(), "partial");
    drop(host_reader);
}

#[test]
fn test_callback_can_unregister_itself() {
    let (reader, mut writer) = UnixStream::pair().unwrap();
    let (mut host_reader, mut host_writer) = UnixStream::pair().unwrap();
    let host_fd = host_reader.as_raw_fd();
    host_writer.write_all(b"once").unwrap();

    let (mut editor, _) = fd_editor(reader);
    editor
        .register_fd_interest(host_fd, FdEventKind::Readable, move |context, fd, kind| {
            let mut buffer = [0; 64];
            let _unused = host_reader.read(&mut buffer);
            context.unregister(fd, kind);
            FdCallbackOutcome::Continue
        })
        .unwrap();
    writer.write_all(b"done\r").unwrap();

    assert_eq!(editor.read_line("> ", None, None).unwrap(), line("done"));
    assert!(!editor.unregister_fd_interest(host_fd, FdEventKind::Readable));
}
