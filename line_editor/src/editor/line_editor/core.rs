// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{AfterSignal, BindOutcome, BindingLayer, BuiltinCapabilities,
            Completer, CompletionEngine, ControlStrings, EditAction, EditMode,
            EditorState, FdCallbackOutcome, FdEventKind, FdWatchContext, FdWatchList,
            FileCompleter, HistoryStore, InMemoryHistory, InputDevice, InputPoller,
            KeyBindingEntry, KeyBindingTable, LineEditorError, PromptStyle, Renderer,
            SYMBOLIC_KEY_NAMES, SignalFlags, SignalTraps, Size, TerminalCapabilities,
            TerminalModeGuard, TrapSession, bind_arrow_keys, install_default_bindings, parse_binding_bytes, query_size};
use libc::c_int;
use std::{fmt::{Debug, Formatter},
          io::{self, Write},
          os::fd::RawFd,
          path::PathBuf};

pub const DEBUG_LINE_EDITOR: bool = false;

/// Used when neither the configuration nor `TERM` names a terminal type.
pub const FALLBACK_TERM_TYPE: &str = "ansi";

/// Settings fixed when the editor is created. Most can be changed later through
/// [`LineEditor`] methods or a configuration file.
#[derive(Debug)]
pub struct LineEditorConfig {
    /// Longest line, in bytes.
    pub buffer_capacity: usize,
    pub edit_mode: EditMode,
    /// `nobeep` in a configuration file turns this off.
    pub bell_enabled: bool,
    /// Whether lines read with [`LineEditor::read_line_incremental`] go to history.
    pub archive_network_history: bool,
    pub prompt_style: PromptStyle,
    /// Overrides `TERM`.
    pub term_type: Option<String>,
    /// Whether [`LineEditor::read_line`] traps signals (see [`crate::SignalTraps`]).
    pub trap_signals: bool,
    /// Overrides the size reported by the terminal.
    pub terminal_size: Option<Size>,
    pub capabilities: Box<dyn TerminalCapabilities>,
}

impl Default for LineEditorConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: crate::DEFAULT_BUFFER_CAPACITY,
            edit_mode: EditMode::default(),
            bell_enabled: true,
            archive_network_history: false,
            prompt_style: PromptStyle::default(),
            term_type: None,
            trap_signals: true,
            terminal_size: None,
            capabilities: Box::new(BuiltinCapabilities),
        }
    }
}

/// Outcome of [`LineEditor::read_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLineEvent {
    /// The completed line, without a trailing newline.
    Line(String),
    /// End of input on an empty line.
    Eof,
}

/// Outcome of [`LineEditor::read_line_incremental`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncrementalReadEvent {
    Line(String),
    /// The byte was consumed and the line is not complete yet.
    Pending,
    Eof,
}

/// Terminal and signal state held for the duration of one read call. Dropping it puts
/// the terminal and the signal dispositions back.
#[derive(Debug, Default)]
pub(crate) struct ActiveSession {
    pub raw_mode: Option<TerminalModeGuard>,
    pub traps: Option<TrapSession>,
}

/// The line editor. See the crate docs.
///
/// One instance edits one line at a time. A failed read (I/O error, aborting signal,
/// aborting host callback) only ends that read; the instance stays usable.
pub struct LineEditor {
    pub(crate) state: EditorState,
    pub(crate) table: KeyBindingTable,
    pub(crate) completion: CompletionEngine,
    pub(crate) completer: Box<dyn Completer>,
    pub(crate) history: Box<dyn HistoryStore>,
    pub(crate) renderer: Renderer,
    pub(crate) output: Box<dyn Write>,
    pub(crate) input: InputDevice,
    pub(crate) poller: Option<InputPoller>,
    /// Set once the input fd turned out to be unpollable (eg: a regular file).
    pub(crate) blocking_reads: bool,
    pub(crate) signal_traps: SignalTraps,
    pub(crate) fd_watches: FdWatchList,
    pub(crate) config: LineEditorConfig,
    pub(crate) init_file: Option<PathBuf>,
    pub(crate) session: Option<ActiveSession>,
    /// The current line is being read with [`LineEditor::read_line_incremental`].
    pub(crate) incremental_active: bool,
}

impl Debug for LineEditor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineEditor")
            .field("state", &self.state)
            .field("bindings", &self.table.len())
            .field("history", &self.history)
            .field("input", &self.input)
            .field("signal_traps", &self.signal_traps)
            .field("fd_watches", &self.fd_watches)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LineEditor {
    /// An editor on the process's stdin and stdout.
    ///
    /// # Errors
    ///
    /// When stdin can't be duplicated, or see [`Self::new_with_io`].
    pub fn try_new_terminal(config: LineEditorConfig) -> Result<Self, LineEditorError> {
        let input = InputDevice::try_new_stdin().map_err(LineEditorError::io("opening stdin"))?;
        Self::new_with_io(config, input, Box::new(io::stdout()))
    }

    /// # Errors
    ///
    /// [`LineEditorError::AllocationFailure`] when the line buffer or the default
    /// bindings can't be allocated.
    pub fn new_with_io(
        config: LineEditorConfig,
        input: InputDevice,
        output: Box<dyn Write>,
    ) -> Result<Self, LineEditorError> {
        let term_type = config
            .term_type
            .clone()
            .or_else(|| std::env::var("TERM").ok().filter(|it| !it.is_empty()))
            .unwrap_or_else(|| FALLBACK_TERM_TYPE.to_owned());
        let control_strings = ControlStrings::resolve(&*config.capabilities, &term_type);

        let mut editor = Self {
            state: EditorState::try_new(config.buffer_capacity, config.edit_mode)?,
            table: KeyBindingTable::new(),
            completion: CompletionEngine::new(),
            completer: Box::new(FileCompleter::new()),
            history: Box::new(InMemoryHistory::default()),
            renderer: Renderer::new(control_strings, Size::default()),
            output,
            input,
            poller: None,
            blocking_reads: false,
            signal_traps: SignalTraps::default(),
            fd_watches: FdWatchList::new(),
            config,
            init_file: None,
            session: None,
            incremental_active: false,
        };
        editor.renderer.size = editor.current_size();
        editor.set_edit_mode(editor.config.edit_mode)?;

        DEBUG_LINE_EDITOR.then(|| {
            tracing::debug!(message = "Line editor created", term_type, bindings = editor.table.len());
        });
        Ok(editor)
    }

    /// The line being edited, or the last line read.
    #[must_use]
    pub fn line(&self) -> String { self.state.buffer.to_string_lossy() }

    #[must_use]
    pub fn line_bytes(&self) -> &[u8] { self.state.line() }

    #[must_use]
    pub fn cursor(&self) -> usize { self.state.cursor }

    #[must_use]
    pub fn edit_mode(&self) -> EditMode { self.state.edit_mode }

    #[must_use]
    pub fn config(&self) -> &LineEditorConfig { &self.config }

    /// Last completion result and error, see [`CompletionEngine::last_error`].
    #[must_use]
    pub fn completion_engine(&self) -> &CompletionEngine { &self.completion }

    #[must_use]
    pub fn history(&self) -> &dyn HistoryStore { &*self.history }

    #[must_use]
    pub fn signal_traps(&self) -> &SignalTraps { &self.signal_traps }

    pub fn set_bell_enabled(&mut self, enabled: bool) { self.config.bell_enabled = enabled; }

    pub fn set_prompt_style(&mut self, style: PromptStyle) { self.config.prompt_style = style; }

    pub fn set_completer(&mut self, completer: impl Completer + 'static) {
        self.completer = Box::new(completer);
    }

    pub fn set_history(&mut self, history: impl HistoryStore + 'static) {
        self.history = Box::new(history);
    }

    /// The file that `read-init-files` reloads. [`Self::load_config_file`] sets it too.
    pub fn set_init_file(&mut self, path: impl Into<PathBuf>) { self.init_file = Some(path.into()); }

    /// Installs the built-in bindings for `mode` and rebinds the arrow keys.
    ///
    /// # Errors
    ///
    /// [`LineEditorError::AllocationFailure`] or a conflict reported by the table.
    pub fn set_edit_mode(&mut self, mode: EditMode) -> Result<(), LineEditorError> {
        self.state.edit_mode = mode;
        self.state.vi.command_mode = false;
        self.table.clear_layer(BindingLayer::Terminal);
        install_default_bindings(&mut self.table, mode)?;
        self.rebind_arrow_keys();
        Ok(())
    }

    /// Binds `spec` (eg: `^X^K`, `M-d`, `\E[A`, `up`) to the action named `action` in
    /// the user layer, or removes the user binding when `action` is `None`.
    ///
    /// # Errors
    ///
    /// [`LineEditorError::UnknownAction`], [`LineEditorError::InvalidKeySequence`], or
    /// [`LineEditorError::BindingConflict`].
    pub fn bind(
        &mut self,
        spec: &str,
        action: Option<&str>,
    ) -> Result<BindOutcome, LineEditorError> {
        self.bind_bytes(BindingLayer::User, spec.as_bytes(), action)
    }

    /// Like [`Self::bind`], with an explicit layer and a typed action.
    ///
    /// # Errors
    ///
    /// See [`Self::bind`].
    pub fn bind_action(
        &mut self,
        layer: BindingLayer,
        spec: &str,
        action: Option<EditAction>,
    ) -> Result<BindOutcome, LineEditorError> {
        self.bind_sequence(layer, spec.as_bytes(), action)
    }

    /// [`Self::bind`] for specs that aren't valid UTF-8 (eg: from a configuration file).
    pub(crate) fn bind_bytes(
        &mut self,
        layer: BindingLayer,
        spec: &[u8],
        action: Option<&str>,
    ) -> Result<BindOutcome, LineEditorError> {
        let action = match action {
            Some(name) => Some(EditAction::from_name(name).ok_or_else(|| {
                LineEditorError::UnknownAction {
                    name: name.to_owned(),
                }
            })?),
            None => None,
        };
        self.bind_sequence(layer, spec, action)
    }

    fn bind_sequence(
        &mut self,
        layer: BindingLayer,
        spec: &[u8],
        action: Option<EditAction>,
    ) -> Result<BindOutcome, LineEditorError> {
        let sequence =
            parse_binding_bytes(spec).map_err(|source| LineEditorError::InvalidKeySequence {
                spec: String::from_utf8_lossy(spec).into_owned(),
                source,
            })?;
        let outcome = self.table.bind(layer, &sequence, action)?;
        if SYMBOLIC_KEY_NAMES
            .iter()
            .any(|name| name.as_bytes() == sequence.as_bytes())
        {
            self.rebind_arrow_keys();
        }
        DEBUG_LINE_EDITOR.then(|| tracing::debug!(message = "bind", %sequence, ?action, ?outcome));
        Ok(outcome)
    }

    /// Every binding, in table order.
    pub fn list_bindings(&self) -> impl Iterator<Item = &KeyBindingEntry> { self.table.entries() }

    fn rebind_arrow_keys(&mut self) {
        let arrow_keys = self.renderer.control_strings.arrow_key_sequences();
        bind_arrow_keys(
            &mut self.table,
            arrow_keys
                .iter()
                .map(|(name, sequences)| (*name, sequences.as_slice())),
        );
    }

    /// Calls `callback` whenever `fd` is ready for `kind` while the editor waits for
    /// terminal input. Replaces an earlier callback for the same fd and kind.
    ///
    /// # Errors
    ///
    /// [`LineEditorError::AllocationFailure`].
    pub fn register_fd_interest(
        &mut self,
        fd: RawFd,
        kind: FdEventKind,
        callback: impl FnMut(&mut FdWatchContext, RawFd, FdEventKind) -> FdCallbackOutcome + 'static,
    ) -> Result<(), LineEditorError> {
        self.fd_watches.register(fd, kind, Box::new(callback))
    }

    /// Returns whether a watch was removed.
    pub fn unregister_fd_interest(&mut self, fd: RawFd, kind: FdEventKind) -> bool {
        self.fd_watches.unregister(fd, kind)
    }

    /// Changes how `signal` is handled during [`Self::read_line`], or starts trapping
    /// it. Takes effect from the next read call.
    ///
    /// # Errors
    ///
    /// [`LineEditorError::AllocationFailure`].
    pub fn trap_signal(
        &mut self,
        signal: c_int,
        flags: SignalFlags,
        after: AfterSignal,
    ) -> Result<(), LineEditorError> {
        self.signal_traps.trap(signal, flags, after)
    }

    pub fn untrap_signal(&mut self, signal: c_int) -> bool { self.signal_traps.untrap(signal) }

    pub fn clear_signal_traps(&mut self) { self.signal_traps.clear(); }

    pub(crate) fn current_size(&self) -> Size {
        self.config
            .terminal_size
            .or_else(|| self.config.capabilities.size())
            .unwrap_or_else(|| query_size(self.input.terminal_fd()))
    }

    /// Redraws what changed since the last refresh.
    pub(crate) fn refresh(&mut self) -> Result<(), LineEditorError> {
        self.renderer
            .refresh(
                &mut *self.output,
                &self.state.prompt,
                self.state.line(),
                self.state.cursor,
            )
            .map_err(LineEditorError::io("writing to the terminal"))
    }

    pub(crate) fn ring_bell(&mut self) -> Result<(), LineEditorError> {
        if !self.config.bell_enabled {
            return Ok(());
        }
        self.renderer
            .ring_bell(&mut *self.output)
            .map_err(LineEditorError::io("writing to the terminal"))
    }
}
