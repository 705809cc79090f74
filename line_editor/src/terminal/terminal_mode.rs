// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Raw mode for one read session, using rustix's safe termios API.
//!
//! [`TerminalModeGuard::try_enter_raw`] saves the caller's terminal attributes and
//! switches to raw mode (no canonical input, no echo, no signal generating keys, no
//! output post processing). The saved attributes are put back by
//! [`TerminalModeGuard::restore`] and, on every other exit path, by [`Drop`].
//!
//! While a signal is forwarded or a host callback prints, the session can temporarily
//! go back to the caller's attributes ([`TerminalModeGuard::restore`] then
//! [`TerminalModeGuard::reapply`]) or just turn output post processing back on
//! ([`TerminalModeGuard::with_output_processing`]).

use rustix::{fd::{AsFd, BorrowedFd, OwnedFd},
             termios::{self, OptionalActions, OutputModes, Termios}};
use std::io;

/// See the module docs.
#[derive(Debug)]
pub struct TerminalModeGuard {
    fd: OwnedFd,
    original: Termios,
    raw: Termios,
    is_raw: bool,
}

impl TerminalModeGuard {
    /// Returns `Ok(None)` when `fd` is not a terminal, in which case nothing changes.
    ///
    /// # Errors
    ///
    /// When the terminal attributes can't be read or set.
    pub fn try_enter_raw(fd: BorrowedFd<'_>) -> io::Result<Option<Self>> {
        if !termios::isatty(fd) {
            return Ok(None);
        }

        let fd = fd.try_clone_to_owned()?;
        let original = termios::tcgetattr(&fd)?;

        // make_raw() matches cfmakeraw(): it clears ICANON, ECHO, ISIG, IEXTEN,
        // OPOST, the input translations, and sets VMIN=1 VTIME=0.
        let mut raw = original.clone();
        raw.make_raw();

        let mut guard = Self {
            fd,
            original,
            raw,
            is_raw: false,
        };
        guard.reapply()?;
        Ok(Some(guard))
    }

    #[must_use]
    pub fn is_raw(&self) -> bool { self.is_raw }

    /// Puts back the attributes saved when the guard was created.
    ///
    /// # Errors
    ///
    /// When the attributes can't be set.
    pub fn restore(&mut self) -> io::Result<()> {
        termios::tcsetattr(&self.fd, OptionalActions::Drain, &self.original)?;
        self.is_raw = false;
        Ok(())
    }

    /// Switches back to raw mode after [`Self::restore`].
    ///
    /// # Errors
    ///
    /// When the attributes can't be set.
    pub fn reapply(&mut self) -> io::Result<()> {
        termios::tcsetattr(&self.fd, OptionalActions::Drain, &self.raw)?;
        self.is_raw = true;
        Ok(())
    }

    /// Runs `f` with output post processing (eg: `\n` to `\r\n`) turned back on.
    ///
    /// # Errors
    ///
    /// When the attributes can't be set. `f` does not run in that case.
    pub fn with_output_processing<R>(&mut self, f: impl FnOnce() -> R) -> io::Result<R> {
        if !self.is_raw {
            return Ok(f());
        }
        let mut cooked_output = self.raw.clone();
        cooked_output.output_modes.insert(OutputModes::OPOST);
        termios::tcsetattr(&self.fd, OptionalActions::Drain, &cooked_output)?;
        let result = f();
        termios::tcsetattr(&self.fd, OptionalActions::Drain, &self.raw)?;
        Ok(result)
    }
}

impl AsFd for TerminalModeGuard {
    fn as_fd(&self) -> BorrowedFd<'_> { self.fd.as_fd() }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        if self.is_raw
            && let Err(error) = self.restore()
        {
            tracing::error!(message = "Failed to restore terminal attributes", %error);
        }
    }
}
