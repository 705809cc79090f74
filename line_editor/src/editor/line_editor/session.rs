// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Read calls. [`LineEditor::read_line`] owns the terminal for the duration of the
//! call: raw mode, signal hooks, and the wait on the terminal plus host fds.
//! [`LineEditor::read_line_incremental`] is fed one byte at a time by the host and
//! never touches the terminal settings or signal dispositions.

use super::{Flow, IncrementalReadEvent, ReadLineEvent, core::ActiveSession};
use crate::{AfterSignal, FdCallbackOutcome, FdDispatchOutcome, FdReadiness, InputDevice,
            InputEvent, InputPoller, LineEditor, LineEditorError, Prompt, SignalFlags,
            SignalTrap, TerminalModeGuard, TrapSession};
use libc::c_int;
use std::{io::Write, os::fd::RawFd};

const DEBUG_SESSION: bool = false;

const TERMINAL_WRITE: &str = "writing to the terminal";

impl LineEditor {
    /// Reads one line from the input device, with `prompt` in front of it.
    ///
    /// `seed` pre-loads the line (eg: for editing an existing value) and `cursor`
    /// places the cursor in it, the default being the end.
    ///
    /// # Errors
    ///
    /// [`LineEditorError::SignalAbort`] when a trapped signal with
    /// [`AfterSignal::Abort`] arrives, [`LineEditorError::FdCallbackAbort`] when a
    /// host fd callback asks to stop, [`LineEditorError::SessionAlreadyActive`] when
    /// another editor is trapping signals, and [`LineEditorError::Io`]. The terminal
    /// settings and signal dispositions are restored in every case, and the edit
    /// buffer keeps the partial line.
    pub fn read_line(
        &mut self,
        prompt: &str,
        seed: Option<&str>,
        cursor: Option<usize>,
    ) -> Result<ReadLineEvent, LineEditorError> {
        self.start_line(prompt, seed.map_or(&[][..], str::as_bytes), cursor);
        self.begin_session()?;

        let result = self.refresh().and_then(|()| self.read_loop());
        let ended = self.end_session();

        let event = result?;
        ended?;
        Ok(event)
    }

    /// Feeds `next_byte` to the line being read, starting a new line first when none
    /// is in progress. `None` just starts the line (and draws the prompt).
    ///
    /// Meant for servers that multiplex many connections, so the terminal is never
    /// put in raw mode and no signals are trapped. Lines read this way only go to
    /// history when [`crate::LineEditorConfig::archive_network_history`] is set.
    ///
    /// # Errors
    ///
    /// As for [`Self::read_line`]. Any error ends the line in progress.
    pub fn read_line_incremental(
        &mut self,
        prompt: &str,
        seed: Option<&str>,
        cursor: Option<usize>,
        next_byte: Option<u8>,
    ) -> Result<IncrementalReadEvent, LineEditorError> {
        if !self.incremental_active {
            self.start_line(prompt, seed.map_or(&[][..], str::as_bytes), cursor);
            self.incremental_active = true;
            if let Err(error) = self.refresh() {
                self.incremental_active = false;
                return Err(error);
            }
        }

        let Some(byte) = next_byte else {
            return Ok(IncrementalReadEvent::Pending);
        };

        let result = self
            .process_byte(byte)
            .and_then(|flow| self.apply_flow(flow));
        match result {
            Ok(None) => Ok(IncrementalReadEvent::Pending),
            Ok(Some(event)) => {
                self.incremental_active = false;
                Ok(match event {
                    ReadLineEvent::Line(line) => IncrementalReadEvent::Line(line),
                    ReadLineEvent::Eof => IncrementalReadEvent::Eof,
                })
            }
            Err(error) => {
                self.incremental_active = false;
                Err(error)
            }
        }
    }

    /// Whether [`Self::read_line_incremental`] has a line in progress.
    #[must_use]
    pub fn is_incremental_line_active(&self) -> bool { self.incremental_active }

    fn start_line(&mut self, prompt: &str, seed: &[u8], cursor: Option<usize>) {
        self.state.reset_line(seed, cursor);
        self.state.prompt = Prompt::new(
            prompt,
            self.config.prompt_style,
            &self.renderer.control_strings,
        );
        self.renderer.forget();
        self.renderer.size = self.current_size();
        self.history.reset_recall();
        self.incremental_active = false;
        if let InputDevice::Terminal(terminal) = &mut self.input {
            terminal.clear_eof();
        }
    }

    fn begin_session(&mut self) -> Result<(), LineEditorError> {
        let raw_mode = match self.input.terminal_fd() {
            Some(fd) => TerminalModeGuard::try_enter_raw(fd)
                .map_err(LineEditorError::io("switching the terminal to raw mode"))?,
            None => None,
        };

        // The raw mode guard restores the terminal if this fails.
        let traps = if self.config.trap_signals && !self.input.is_mock() {
            Some(TrapSession::install(&self.signal_traps)?)
        } else {
            None
        };

        DEBUG_SESSION.then(|| {
            tracing::debug!(
                message = "Read session started",
                raw_mode = raw_mode.is_some(),
                traps = traps.is_some()
            );
        });
        self.session = Some(ActiveSession { raw_mode, traps });
        Ok(())
    }

    fn end_session(&mut self) -> Result<(), LineEditorError> {
        let flushed = self
            .output
            .flush()
            .map_err(LineEditorError::io(TERMINAL_WRITE));

        // The signal pipe is closed below, its fd number may be reused next time.
        if let Some(poller) = self.poller.as_mut() {
            poller.clear();
        }

        let restored = match self.session.take() {
            Some(ActiveSession {
                raw_mode: Some(mut guard),
                traps,
            }) => {
                drop(traps);
                guard
                    .restore()
                    .map_err(LineEditorError::io("restoring the terminal settings"))
            }
            _ => Ok(()),
        };
        flushed.and(restored)
    }

    fn read_loop(&mut self) -> Result<ReadLineEvent, LineEditorError> {
        loop {
            let flow = match self.next_event()? {
                InputEvent::Byte(byte) => self.process_byte(byte)?,
                InputEvent::Signal(signal) => self.handle_signal(signal)?,
                InputEvent::Eof => Flow::Eof,
            };
            if let Some(event) = self.apply_flow(flow)? {
                return Ok(event);
            }
        }
    }

    /// `Some` when the line is over.
    fn apply_flow(&mut self, flow: Flow) -> Result<Option<ReadLineEvent>, LineEditorError> {
        match flow {
            Flow::Continue => {
                self.refresh()?;
                Ok(None)
            }
            Flow::LineDone => self.complete_line().map(Some),
            Flow::Eof if self.state.is_empty() => {
                self.renderer
                    .finish_line(&mut *self.output)
                    .map_err(LineEditorError::io(TERMINAL_WRITE))?;
                Ok(Some(ReadLineEvent::Eof))
            }
            Flow::Eof => self.complete_line().map(Some),
            Flow::Signal(signal) => {
                if self.session_traps(signal) {
                    // Goes through the installed hooks. The read loop picks it up as
                    // a pending signal.
                    signal_hook::low_level::raise(signal)
                        .map_err(LineEditorError::io("raising a signal"))?;
                    Ok(None)
                } else {
                    let flow = self.handle_signal(signal)?;
                    self.apply_flow(flow)
                }
            }
        }
    }

    fn session_traps(&self, signal: c_int) -> bool {
        self.session
            .as_ref()
            .and_then(|it| it.traps.as_ref())
            .is_some_and(|traps| traps.is_trapped(signal))
    }

    fn complete_line(&mut self) -> Result<ReadLineEvent, LineEditorError> {
        self.renderer
            .finish_line(&mut *self.output)
            .map_err(LineEditorError::io(TERMINAL_WRITE))?;

        let line = self.state.buffer.to_string_lossy();
        if !self.incremental_active || self.config.archive_network_history {
            self.history.append(&line);
        }
        self.end_history_browse();
        self.history.reset_recall();

        DEBUG_SESSION.then(|| tracing::debug!(message = "Line complete", line));
        Ok(ReadLineEvent::Line(line))
    }

    fn next_event(&mut self) -> Result<InputEvent, LineEditorError> {
        loop {
            if let Some(signal) = self
                .session
                .as_mut()
                .and_then(|it| it.traps.as_mut())
                .and_then(TrapSession::take_pending)
            {
                return Ok(InputEvent::Signal(signal));
            }

            let terminal = match &mut self.input {
                InputDevice::Mock(script) => return Ok(script.next_event()),
                InputDevice::Terminal(terminal) => terminal,
            };
            if let Some(byte) = terminal.take_byte() {
                return Ok(InputEvent::Byte(byte));
            }
            if terminal.at_eof() {
                return Ok(InputEvent::Eof);
            }

            self.wait_for_input()?;
        }
    }

    fn read_terminal_chunk(&mut self) -> Result<(), LineEditorError> {
        match &mut self.input {
            InputDevice::Terminal(terminal) => terminal
                .read_chunk()
                .map_err(LineEditorError::io("reading from the terminal")),
            InputDevice::Mock(_) => Ok(()),
        }
    }

    /// Blocks until the terminal, the signal pipe, or a watched host fd is ready, and
    /// handles whatever is ready apart from signals (which [`Self::next_event`]
    /// collects).
    fn wait_for_input(&mut self) -> Result<(), LineEditorError> {
        let InputDevice::Terminal(terminal) = &self.input else {
            return Ok(());
        };
        let terminal_fd = terminal.raw_fd();
        if self.blocking_reads {
            return self.read_terminal_chunk();
        }

        let signal_pipe = self
            .session
            .as_ref()
            .and_then(|it| it.traps.as_ref())
            .map(TrapSession::pipe_fd);
        let interests = self.fd_watches.interests();

        if self.poller.is_none() {
            self.poller = Some(
                InputPoller::try_new().map_err(LineEditorError::io("creating the input poller"))?,
            );
        }
        let Some(poller) = self.poller.as_mut() else {
            return Ok(());
        };

        let readiness = match poller.wait(terminal_fd, signal_pipe, &interests) {
            Ok(readiness) => readiness,
            // Regular files can't be polled, they are always readable anyway.
            Err(error) if error.raw_os_error() == Some(libc::EPERM) => {
                DEBUG_SESSION.then(|| tracing::debug!(message = "Input fd is not pollable", terminal_fd));
                poller.clear();
                self.blocking_reads = true;
                return self.read_terminal_chunk();
            }
            Err(error) => return Err(LineEditorError::io("waiting for input")(error)),
        };

        if readiness.signals
            && let Some(traps) = self.session.as_mut().and_then(|it| it.traps.as_mut())
        {
            traps.drain_pipe();
        }
        if !readiness.host.is_empty() {
            self.dispatch_host_fds(&readiness.host)?;
        }
        if readiness.terminal {
            self.read_terminal_chunk()?;
        }
        Ok(())
    }

    /// Runs host callbacks with the terminal's output processing turned back on, so
    /// whatever they print comes out as it would outside the editor.
    fn dispatch_host_fds(&mut self, ready: &[(RawFd, FdReadiness)]) -> Result<(), LineEditorError> {
        let mut raw_mode = self.session.as_mut().and_then(|it| it.raw_mode.as_mut());
        let mut run = |callback: &mut dyn FnMut() -> FdCallbackOutcome| match raw_mode.as_mut() {
            Some(guard) => guard.with_output_processing(callback).unwrap_or_else(|error| {
                tracing::warn!(message = "Could not adjust the terminal for a host callback", %error);
                FdCallbackOutcome::Continue
            }),
            None => callback(),
        };

        match self.fd_watches.dispatch(ready, &mut run) {
            FdDispatchOutcome::Continue => Ok(()),
            FdDispatchOutcome::Refresh => {
                self.renderer.forget();
                self.refresh()
            }
            FdDispatchOutcome::Abort(fd) => {
                self.renderer
                    .finish_line(&mut *self.output)
                    .map_err(LineEditorError::io(TERMINAL_WRITE))?;
                Err(LineEditorError::FdCallbackAbort { fd })
            }
        }
    }

    /// Handles a signal that arrived during a read (or that an action asked for) in
    /// the order the trap's flags describe: tidy the display, give the terminal and
    /// the signal back to the host, forward the signal, take everything back, then
    /// continue as [`AfterSignal`] says.
    pub(crate) fn handle_signal(&mut self, signal: c_int) -> Result<Flow, LineEditorError> {
        let trap = self.signal_traps.get(signal).unwrap_or(SignalTrap {
            signal,
            flags: SignalFlags::empty(),
            after: AfterSignal::Resume,
        });
        DEBUG_SESSION.then(|| tracing::debug!(message = "Handling signal", ?trap));
        let flags = trap.flags;

        if signal == libc::SIGWINCH {
            self.renderer
                .erase_line(&mut *self.output)
                .map_err(LineEditorError::io(TERMINAL_WRITE))?;
            self.renderer.size = self.current_size();
        }
        if flags.contains(SignalFlags::RESTORE_LINE) {
            self.renderer
                .finish_line(&mut *self.output)
                .map_err(LineEditorError::io(TERMINAL_WRITE))?;
        }
        self.output
            .flush()
            .map_err(LineEditorError::io(TERMINAL_WRITE))?;

        if let Some(session) = self.session.as_mut() {
            if flags.contains(SignalFlags::RESTORE_TERMINAL)
                && let Some(guard) = session.raw_mode.as_mut()
            {
                guard
                    .restore()
                    .map_err(LineEditorError::io("restoring the terminal settings"))?;
            }
            if let Some(traps) = session.traps.as_mut() {
                if flags.contains(SignalFlags::RESTORE_SIGNALS) {
                    traps.pop_hooks();
                }
                traps.forward(signal);
                if flags.contains(SignalFlags::RESTORE_SIGNALS) {
                    traps.push_hooks()?;
                }
            }
            if flags.contains(SignalFlags::RESTORE_TERMINAL)
                && let Some(guard) = session.raw_mode.as_mut()
            {
                guard
                    .reapply()
                    .map_err(LineEditorError::io("switching the terminal to raw mode"))?;
            }
        }

        match trap.after {
            AfterSignal::ReturnLine => Ok(Flow::LineDone),
            AfterSignal::Abort => {
                self.state.key_sequence.clear();
                self.state.pending_argument = None;
                self.state.numeric_argument.clear();
                Err(LineEditorError::SignalAbort { signal })
            }
            AfterSignal::Resume => {
                // The size may have changed while the process was stopped.
                self.renderer.size = self.current_size();
                if flags.contains(SignalFlags::REDRAW_LINE)
                    && !flags.contains(SignalFlags::RESTORE_LINE)
                {
                    self.renderer
                        .erase_line(&mut *self.output)
                        .map_err(LineEditorError::io(TERMINAL_WRITE))?;
                }
                Ok(Flow::Continue)
            }
        }
    }
}
