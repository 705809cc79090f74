// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Where the editor's input comes from.
//!
//! [`InputDevice::Terminal`] reads a real fd. Waiting happens in [`InputPoller`] with
//! [`mio`], on the terminal, the signal self-pipe, and the host's watched fds at once,
//! so a signal or a host fd interrupts the wait without a blocking read in the way.
//! [`InputDevice::Mock`] replays scripted [`InputEvent`]s for tests.

use super::FdReadiness;
use libc::c_int;
use mio::{Events, Interest, Poll, Token, unix::SourceFd};
use rustix::fd::{AsFd, BorrowedFd, OwnedFd};
use std::{collections::VecDeque,
          io,
          os::fd::{AsRawFd, RawFd}};

pub const DEBUG_INPUT: bool = false;

/// Bytes read from the terminal per system call.
pub const READ_CHUNK_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Byte(u8),
    /// A signal to handle as if it had been trapped.
    Signal(c_int),
    Eof,
}

/// Scripted input. Once the script runs out every read is [`InputEvent::Eof`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
}

impl ScriptedInput {
    pub fn push(&mut self, event: InputEvent) { self.events.push_back(event); }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.events.extend(bytes.iter().copied().map(InputEvent::Byte));
    }

    pub fn next_event(&mut self) -> InputEvent {
        self.events.pop_front().unwrap_or(InputEvent::Eof)
    }

    #[must_use]
    pub fn remaining(&self) -> usize { self.events.len() }
}

/// A terminal (or any other readable fd) and the bytes read from it but not consumed
/// yet.
#[derive(Debug)]
pub struct TerminalInput {
    fd: OwnedFd,
    pending: VecDeque<u8>,
    at_eof: bool,
}

impl TerminalInput {
    #[must_use]
    pub fn new(fd: OwnedFd) -> Self {
        Self {
            fd,
            pending: VecDeque::with_capacity(READ_CHUNK_SIZE),
            at_eof: false,
        }
    }

    #[must_use]
    pub fn raw_fd(&self) -> RawFd { self.fd.as_raw_fd() }

    pub fn take_byte(&mut self) -> Option<u8> { self.pending.pop_front() }

    #[must_use]
    pub fn at_eof(&self) -> bool { self.at_eof }

    /// Forgets a previous end of input, so the next read call tries again.
    pub fn clear_eof(&mut self) { self.at_eof = false; }

    /// One `read(2)`. An interrupted or would-block read just reads nothing.
    ///
    /// # Errors
    ///
    /// Any other read error.
    pub fn read_chunk(&mut self) -> io::Result<()> {
        let mut buffer = [0; READ_CHUNK_SIZE];
        match rustix::io::read(&self.fd, &mut buffer[..]) {
            Ok(0) => self.at_eof = true,
            Ok(count) => self.pending.extend(&buffer[..count]),
            Err(rustix::io::Errno::INTR | rustix::io::Errno::AGAIN) => {}
            Err(errno) => return Err(errno.into()),
        }
        DEBUG_INPUT.then(|| tracing::debug!(message = "read chunk", pending = self.pending.len(), self.at_eof));
        Ok(())
    }
}

impl AsFd for TerminalInput {
    fn as_fd(&self) -> BorrowedFd<'_> { self.fd.as_fd() }
}

#[derive(Debug)]
pub enum InputDevice {
    Terminal(TerminalInput),
    Mock(ScriptedInput),
}

impl InputDevice {
    #[must_use]
    pub fn new_mock(events: impl IntoIterator<Item = InputEvent>) -> Self {
        InputDevice::Mock(ScriptedInput {
            events: events.into_iter().collect(),
        })
    }

    #[must_use]
    pub fn new_mock_bytes(bytes: &[u8]) -> Self {
        Self::new_mock(bytes.iter().copied().map(InputEvent::Byte))
    }

    /// Reads from a duplicate of the process's standard input.
    ///
    /// # Errors
    ///
    /// When stdin can't be duplicated.
    pub fn try_new_stdin() -> io::Result<Self> {
        let fd = io::stdin().as_fd().try_clone_to_owned()?;
        Ok(Self::from_fd(fd))
    }

    #[must_use]
    pub fn from_fd(fd: impl Into<OwnedFd>) -> Self {
        InputDevice::Terminal(TerminalInput::new(fd.into()))
    }

    /// The fd to put in raw mode and ask for the window size.
    #[must_use]
    pub fn terminal_fd(&self) -> Option<BorrowedFd<'_>> {
        match self {
            InputDevice::Terminal(terminal) => Some(terminal.as_fd()),
            InputDevice::Mock(_) => None,
        }
    }

    #[must_use]
    pub fn is_mock(&self) -> bool { matches!(self, InputDevice::Mock(_)) }
}

/// Identifies which registered source a [`Token`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKindReady {
    Terminal,
    /// The signal self-pipe.
    Signals,
    /// A host fd, by its index in the interest list given to [`InputPoller::wait`].
    Host(usize),
}

impl SourceKindReady {
    const FIRST_HOST_TOKEN: usize = 2;

    #[must_use]
    pub const fn to_token(self) -> Token {
        match self {
            Self::Terminal => Token(0),
            Self::Signals => Token(1),
            Self::Host(index) => Token(Self::FIRST_HOST_TOKEN + index),
        }
    }

    #[must_use]
    pub const fn from_token(token: Token) -> Self {
        match token.0 {
            0 => Self::Terminal,
            1 => Self::Signals,
            other => Self::Host(other - Self::FIRST_HOST_TOKEN),
        }
    }
}

/// What one [`InputPoller::wait`] found ready.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitReadiness {
    pub terminal: bool,
    pub signals: bool,
    /// Host fds in the order they were reported.
    pub host: Vec<(RawFd, FdReadiness)>,
}

impl WaitReadiness {
    #[must_use]
    pub fn is_empty(&self) -> bool { !self.terminal && !self.signals && self.host.is_empty() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registration {
    token: Token,
    fd: RawFd,
    interest: Interest,
}

/// Waits on the terminal, the signal pipe and host fds together.
///
/// [`mio`] is edge triggered, so every wait registers (or re-registers) all sources.
/// Re-registering re-arms a source that is still ready, which gives the level
/// triggered behavior the read loop needs: unread bytes or an unhandled host fd show
/// up again on the next wait.
#[derive(Debug)]
pub struct InputPoller {
    poll: Poll,
    events: Events,
    registered: Vec<Registration>,
}

impl InputPoller {
    pub const EVENTS_CAPACITY: usize = 16;

    /// # Errors
    ///
    /// When the OS poller can't be created.
    pub fn try_new() -> io::Result<Self> {
        Ok(Self {
            poll: Poll::new()?,
            events: Events::with_capacity(Self::EVENTS_CAPACITY),
            registered: vec![],
        })
    }

    /// Blocks until one of the sources is ready. An interrupted wait returns empty
    /// readiness.
    ///
    /// # Errors
    ///
    /// When the terminal or the signal pipe can't be registered (eg: a regular file
    /// can't be polled), or the wait fails. Host fds that can't be registered are
    /// logged and skipped.
    pub fn wait(
        &mut self,
        terminal: RawFd,
        signal_pipe: Option<RawFd>,
        host: &[(RawFd, Interest)],
    ) -> io::Result<WaitReadiness> {
        let mut wanted = Vec::with_capacity(host.len() + 2);
        wanted.push(Registration {
            token: SourceKindReady::Terminal.to_token(),
            fd: terminal,
            interest: Interest::READABLE,
        });
        if let Some(fd) = signal_pipe {
            wanted.push(Registration {
                token: SourceKindReady::Signals.to_token(),
                fd,
                interest: Interest::READABLE,
            });
        }
        for (index, (fd, interest)) in host.iter().enumerate() {
            wanted.push(Registration {
                token: SourceKindReady::Host(index).to_token(),
                fd: *fd,
                interest: *interest,
            });
        }
        self.sync_registrations(&wanted)?;

        if let Err(error) = self.poll.poll(&mut self.events, None) {
            if error.kind() == io::ErrorKind::Interrupted {
                return Ok(WaitReadiness::default());
            }
            return Err(error);
        }

        let mut readiness = WaitReadiness::default();
        for event in &self.events {
            let closed = event.is_read_closed() || event.is_error();
            match SourceKindReady::from_token(event.token()) {
                SourceKindReady::Terminal => readiness.terminal = true,
                SourceKindReady::Signals => readiness.signals = true,
                SourceKindReady::Host(index) => {
                    let Some((fd, _)) = host.get(index) else {
                        continue;
                    };
                    let found = FdReadiness {
                        urgent: event.is_priority(),
                        readable: event.is_readable() || closed,
                        writable: event.is_writable() || event.is_write_closed(),
                    };
                    match readiness.host.iter_mut().find(|(it, _)| it == fd) {
                        Some((_, existing)) => *existing = existing.merge(found),
                        None => readiness.host.push((*fd, found)),
                    }
                }
            }
        }
        Ok(readiness)
    }

    fn sync_registrations(&mut self, wanted: &[Registration]) -> io::Result<()> {
        let registry = self.poll.registry();

        let mut kept = Vec::with_capacity(wanted.len());
        for old in self.registered.drain(..) {
            if wanted.iter().any(|it| it.token == old.token && it.fd == old.fd) {
                kept.push(old);
            } else if let Err(error) = registry.deregister(&mut SourceFd(&old.fd)) {
                // The host may already have closed it.
                DEBUG_INPUT.then(|| tracing::debug!(message = "deregister failed", old.fd, %error));
            }
        }

        for registration in wanted {
            let source = &mut SourceFd(&registration.fd);
            let result = if kept.iter().any(|it| it.token == registration.token) {
                // A closed and reused fd number is no longer known to the poller.
                registry
                    .reregister(source, registration.token, registration.interest)
                    .or_else(|_| registry.register(source, registration.token, registration.interest))
            } else {
                registry.register(source, registration.token, registration.interest)
            };
            match result {
                Ok(()) => self.registered.push(*registration),
                Err(error) => match SourceKindReady::from_token(registration.token) {
                    SourceKindReady::Terminal | SourceKindReady::Signals => return Err(error),
                    SourceKindReady::Host(_) => {
                        tracing::warn!(message = "Can't watch host fd", registration.fd, %error);
                    }
                },
            }
        }
        Ok(())
    }

    /// Drops every registration, eg: at the end of a read session.
    pub fn clear(&mut self) {
        let registry = self.poll.registry();
        for old in self.registered.drain(..) {
            let _unused = registry.deregister(&mut SourceFd(&old.fd));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::{io::Write, os::unix::net::UnixStream};

    #[test]
    fn test_scripted_input_ends_with_eof() {
        let mut input = ScriptedInput::default();
        input.push_bytes(b"a");
        input.push(InputEvent::Signal(2));
        assert_eq!(input.next_event(), InputEvent::Byte(b'a'));
        assert_eq!(input.next_event(), InputEvent::Signal(2));
        assert_eq!(input.next_event(), InputEvent::Eof);
        assert_eq!(input.next_event(), InputEvent::Eof);
    }

    #[test]
    fn test_tokens_round_trip() {
        for kind in [
            SourceKindReady::Terminal,
            SourceKindReady::Signals,
            SourceKindReady::Host(0),
            SourceKindReady::Host(5),
        ] {
            assert_eq!(SourceKindReady::from_token(kind.to_token()), kind);
        }
    }

    #[test]
    fn test_wait_reports_terminal_and_host() {
        let (terminal_reader, mut terminal_writer) = UnixStream::pair().unwrap();
        let (host_reader, mut host_writer) = UnixStream::pair().unwrap();
        let mut terminal = TerminalInput::new(terminal_reader.into());
        let mut poller = InputPoller::try_new().unwrap();
        let host = [(host_reader.as_raw_fd(), Interest::READABLE)];

        host_writer.write_all(b"x").unwrap();
        let readiness = poller.wait(terminal.raw_fd(), None, &host).unwrap();
        assert!(!readiness.terminal);
        assert_eq!(readiness.host.len(), 1);
        assert!(readiness.host[0].1.readable);

        // Still unread, so it is reported again.
        terminal_writer.write_all(b"hi").unwrap();
        let readiness = poller.wait(terminal.raw_fd(), None, &host).unwrap();
        assert!(readiness.terminal);
        assert_eq!(readiness.host.len(), 1);

        terminal.read_chunk().unwrap();
        assert_eq!(terminal.take_byte(), Some(b'h'));
        assert_eq!(terminal.take_byte(), Some(b'i'));
        assert_eq!(terminal.take_byte(), None);

        drop(terminal_writer);
        terminal.read_chunk().unwrap();
        assert!(terminal.at_eof());
    }
}
