// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words sigaction sigset sigmask sigismember sigaddset sigemptyset VTALRM XCPU XFSZ

//! Signal trapping for a read session.
//!
//! While a line is read, the editor owns the terminal, so a signal that stops or ends
//! the process must first put the terminal back. [`SignalTraps`] says, per signal, what
//! to restore around the signal ([`SignalFlags`]) and what the read call does after it
//! ([`AfterSignal`]).
//!
//! [`TrapSession`] installs the traps for one read call with [`signal_hook`]: an
//! [`AtomicBool`] per signal records which one arrived, and a self-pipe (one duplicate
//! descriptor per registration) wakes the [`mio`] wait. The signal is then handled
//! synchronously by the read loop, never in the handler. The full `sigaction` each
//! signal had when the session started is saved, and forwarding works like a stack:
//!
//! 1. Pop: reinstate the saved dispositions and drop the editor's hooks
//!    ([`SignalFlags::RESTORE_SIGNALS`]).
//! 2. Forward: raise the signal again, unblocked, with its saved disposition in
//!    place. A default action or the host's own handler runs now, after the terminal
//!    and the line were dealt with.
//! 3. Push: hook the signals again.
//!
//! Only one trapping session may exist per process, see [`SessionClaim`].

use super::LineEditorError;
use libc::c_int;
use signal_hook::{SigId,
                  consts::signal::{SIGABRT, SIGALRM, SIGCONT, SIGHUP, SIGINT, SIGPIPE,
                                   SIGQUIT, SIGTERM, SIGTSTP, SIGTTIN, SIGTTOU, SIGUSR1,
                                   SIGUSR2, SIGVTALRM, SIGWINCH, SIGXCPU, SIGXFSZ},
                  low_level};
use std::{io::{self, Read},
          os::fd::{AsFd, AsRawFd, RawFd},
          sync::{Arc, Mutex,
                 atomic::{AtomicBool, Ordering}}};

pub const DEBUG_SIGNALS: bool = false;

bitflags::bitflags! {
    /// What to restore while a trapped signal is handled.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SignalFlags: u8 {
        /// Put back the signal dispositions that were in place before the read.
        const RESTORE_SIGNALS = 1 << 0;
        /// Put back the caller's terminal attributes.
        const RESTORE_TERMINAL = 1 << 1;
        /// Move the cursor below the line being edited.
        const RESTORE_LINE = 1 << 2;
        /// Draw the line again when editing resumes.
        const REDRAW_LINE = 1 << 3;
        /// Trap the signal even when the caller has it blocked.
        const UNBLOCK = 1 << 4;
        /// Don't emulate the default action of the signal.
        const DONT_FORWARD = 1 << 5;

        const RESTORE_ENVIRONMENT = Self::RESTORE_SIGNALS.bits()
            | Self::RESTORE_TERMINAL.bits()
            | Self::REDRAW_LINE.bits();
        const SUSPEND_INPUT = Self::RESTORE_ENVIRONMENT.bits() | Self::RESTORE_LINE.bits();
    }
}

/// What the read call does once a trapped signal was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSignal {
    /// Return the line as if the user pressed return.
    ReturnLine,
    /// Fail with [`LineEditorError::SignalAbort`].
    Abort,
    /// Carry on editing.
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalTrap {
    pub signal: c_int,
    pub flags: SignalFlags,
    pub after: AfterSignal,
}

/// The list of trapped signals. [`Default`] gives the standard set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalTraps {
    traps: Vec<SignalTrap>,
}

impl Default for SignalTraps {
    fn default() -> Self {
        let mut traps = Vec::with_capacity(17);
        for signal in [SIGABRT, SIGHUP, SIGINT, SIGPIPE, SIGQUIT, SIGTERM] {
            traps.push(SignalTrap {
                signal,
                flags: SignalFlags::SUSPEND_INPUT,
                after: AfterSignal::Abort,
            });
        }
        for signal in [SIGTSTP, SIGTTIN, SIGTTOU] {
            traps.push(SignalTrap {
                signal,
                flags: SignalFlags::SUSPEND_INPUT,
                after: AfterSignal::Resume,
            });
        }
        for signal in [
            SIGALRM, SIGCONT, SIGUSR1, SIGUSR2, SIGVTALRM, SIGXCPU, SIGXFSZ, SIGWINCH,
        ] {
            traps.push(SignalTrap {
                signal,
                flags: SignalFlags::RESTORE_ENVIRONMENT,
                after: AfterSignal::Resume,
            });
        }
        Self { traps }
    }
}

impl SignalTraps {
    #[must_use]
    pub fn empty() -> Self { Self { traps: vec![] } }

    #[must_use]
    pub fn get(&self, signal: c_int) -> Option<SignalTrap> {
        self.traps.iter().find(|it| it.signal == signal).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignalTrap> { self.traps.iter() }

    #[must_use]
    pub fn len(&self) -> usize { self.traps.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.traps.is_empty() }

    /// Adds a trap, or changes the existing one for `signal`.
    ///
    /// # Errors
    ///
    /// [`LineEditorError::AllocationFailure`], leaving the list as it was.
    pub fn trap(
        &mut self,
        signal: c_int,
        flags: SignalFlags,
        after: AfterSignal,
    ) -> Result<(), LineEditorError> {
        let trap = SignalTrap {
            signal,
            flags,
            after,
        };
        if let Some(existing) = self.traps.iter_mut().find(|it| it.signal == signal) {
            *existing = trap;
            return Ok(());
        }
        self.traps
            .try_reserve(1)
            .map_err(|_| LineEditorError::AllocationFailure { what: "signal list" })?;
        self.traps.push(trap);
        Ok(())
    }

    /// Returns whether `signal` was trapped.
    pub fn untrap(&mut self, signal: c_int) -> bool {
        let before = self.traps.len();
        self.traps.retain(|it| it.signal != signal);
        before != self.traps.len()
    }

    pub fn clear(&mut self) { self.traps.clear(); }
}

static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Proof that this is the only signal trapping session in the process. Released on
/// drop.
#[derive(Debug)]
pub struct SessionClaim {
    _private: (),
}

impl SessionClaim {
    /// # Errors
    ///
    /// [`LineEditorError::SessionAlreadyActive`] while another claim is alive.
    pub fn try_claim() -> Result<Self, LineEditorError> {
        if SESSION_ACTIVE.swap(true, Ordering::SeqCst) {
            return Err(LineEditorError::SessionAlreadyActive);
        }
        Ok(Self { _private: () })
    }
}

impl Drop for SessionClaim {
    fn drop(&mut self) { SESSION_ACTIVE.store(false, Ordering::SeqCst); }
}

/// What a signal disposition does, without the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispositionKind {
    Default,
    Ignore,
    Handler,
}

/// A full `sigaction`, so that it can be put back exactly as it was.
#[derive(Clone, Copy)]
struct Disposition(libc::sigaction);

impl std::fmt::Debug for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Disposition").field(&self.kind()).finish()
    }
}

impl Disposition {
    fn query(signal: c_int) -> io::Result<Self> {
        // SAFETY: sigaction is plain old data, and a null new action only reads the
        // current one into `current`.
        let mut current: libc::sigaction = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::sigaction(signal, std::ptr::null(), &raw mut current) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self(current))
    }

    fn ignore() -> Self {
        // SAFETY: as above, and `sa_mask` is initialized by sigemptyset.
        let mut action: libc::sigaction = unsafe { std::mem::zeroed() };
        action.sa_sigaction = libc::SIG_IGN;
        unsafe { libc::sigemptyset(&raw mut action.sa_mask) };
        Self(action)
    }

    fn install(&self, signal: c_int) -> io::Result<()> {
        // SAFETY: `self.0` is a complete action, read back from the OS or built above.
        let rc = unsafe { libc::sigaction(signal, &raw const self.0, std::ptr::null_mut()) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn kind(&self) -> DispositionKind {
        match self.0.sa_sigaction {
            libc::SIG_DFL => DispositionKind::Default,
            libc::SIG_IGN => DispositionKind::Ignore,
            _ => DispositionKind::Handler,
        }
    }

    fn same_handler(&self, other: &Self) -> bool { self.0.sa_sigaction == other.0.sa_sigaction }
}

/// # Errors
///
/// When the disposition can't be queried.
pub fn current_disposition(signal: c_int) -> io::Result<DispositionKind> {
    Disposition::query(signal).map(|it| it.kind())
}

/// The OS level handler [`signal_hook`] installed per signal. The registry installs it
/// only once per process and never again, so it is kept here to be reinstated by the
/// next [`TrapSession::push_hooks`] after the original disposition was put back.
static REGISTRY_HANDLERS: Mutex<Vec<(c_int, Disposition)>> = Mutex::new(Vec::new());

fn registry_handler(signal: c_int) -> Option<Disposition> {
    REGISTRY_HANDLERS
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .iter()
        .find(|(it, _)| *it == signal)
        .map(|(_, handler)| *handler)
}

fn remember_registry_handler(signal: c_int, handler: Disposition) {
    REGISTRY_HANDLERS
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .push((signal, handler));
}

fn empty_signal_set() -> libc::sigset_t {
    // SAFETY: sigemptyset initializes the set it is given.
    let mut set: libc::sigset_t = unsafe { std::mem::zeroed() };
    unsafe { libc::sigemptyset(&raw mut set) };
    set
}

fn blocked_signals() -> io::Result<libc::sigset_t> {
    let mut set = empty_signal_set();
    // SAFETY: a null new set only reads the calling thread's mask.
    let rc = unsafe { libc::pthread_sigmask(libc::SIG_BLOCK, std::ptr::null(), &raw mut set) };
    if rc != 0 {
        return Err(io::Error::from_raw_os_error(rc));
    }
    Ok(set)
}

fn is_member(set: &libc::sigset_t, signal: c_int) -> bool {
    // SAFETY: `set` was initialized by sigemptyset or pthread_sigmask.
    unsafe { libc::sigismember(set, signal) == 1 }
}

/// Raises `signal` in the calling thread with it unblocked, then puts the mask back.
fn raise_unblocked(signal: c_int) -> io::Result<()> {
    let mut only = empty_signal_set();
    let mut saved = empty_signal_set();
    // SAFETY: both sets are initialized.
    let rc = unsafe {
        libc::sigaddset(&raw mut only, signal);
        libc::pthread_sigmask(libc::SIG_UNBLOCK, &raw const only, &raw mut saved)
    };
    if rc != 0 {
        return Err(io::Error::from_raw_os_error(rc));
    }
    let raised = low_level::raise(signal);
    // SAFETY: `saved` was filled in by pthread_sigmask.
    let rc = unsafe { libc::pthread_sigmask(libc::SIG_SETMASK, &raw const saved, std::ptr::null_mut()) };
    if rc != 0 {
        return Err(io::Error::from_raw_os_error(rc));
    }
    raised
}

#[derive(Debug)]
struct TrappedSignal {
    signal: c_int,
    flags: SignalFlags,
    /// The disposition when the session was installed.
    original: Disposition,
    arrived: Arc<AtomicBool>,
    hook_ids: Option<(SigId, SigId)>,
}

impl TrappedSignal {
    /// Registers the flag and the self-pipe actions, each action with its own
    /// duplicate of `pipe`, then makes sure the registry's handler is the one
    /// installed.
    fn hook(&mut self, pipe: &mio::net::UnixStream) -> io::Result<()> {
        let known_handler = registry_handler(self.signal);
        if known_handler.is_none() {
            // The registry runs the disposition it replaces before its actions, so
            // it replaces `SIG_IGN` rather than the host's handler.
            Disposition::ignore().install(self.signal)?;
        }

        let flag_id = signal_hook::flag::register(self.signal, Arc::clone(&self.arrived))?;
        let pipe_id = pipe
            .as_fd()
            .try_clone_to_owned()
            .and_then(|wake_fd| low_level::pipe::register(self.signal, wake_fd));
        let pipe_id = match pipe_id {
            Ok(it) => it,
            Err(error) => {
                low_level::unregister(flag_id);
                return Err(error);
            }
        };
        self.hook_ids = Some((flag_id, pipe_id));

        match known_handler {
            Some(handler) => handler.install(self.signal),
            None => {
                let current = Disposition::query(self.signal)?;
                if current.kind() == DispositionKind::Ignore {
                    // The host hooked this signal through the registry before: its
                    // handler is already the original one.
                    self.original.install(self.signal)?;
                    remember_registry_handler(self.signal, self.original);
                } else {
                    remember_registry_handler(self.signal, current);
                }
                Ok(())
            }
        }
    }

    /// Puts the original disposition back, then drops the actions (which closes
    /// their pipe duplicates).
    fn unhook(&mut self) {
        let Some((flag_id, pipe_id)) = self.hook_ids.take() else {
            return;
        };
        if let Err(error) = self.original.install(self.signal) {
            tracing::error!(message = "Failed to restore a signal disposition", signal = self.signal, %error);
        }
        low_level::unregister(flag_id);
        low_level::unregister(pipe_id);
    }
}

/// Signal hooks for one read call. See the module docs.
pub struct TrapSession {
    trapped: Vec<TrappedSignal>,
    pipe_read: mio::net::UnixStream,
    pipe_write: mio::net::UnixStream,
    saved_mask: Option<libc::sigset_t>,
    _claim: SessionClaim,
}

impl std::fmt::Debug for TrapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrapSession")
            .field("trapped", &self.trapped)
            .field("pipe_read", &self.pipe_read)
            .field("pipe_write", &self.pipe_write)
            .field("mask_changed", &self.saved_mask.is_some())
            .finish_non_exhaustive()
    }
}

impl TrapSession {
    /// Hooks every signal in `traps`, except the ones the process ignores and the ones
    /// the caller blocks (unless the trap has [`SignalFlags::UNBLOCK`]).
    ///
    /// # Errors
    ///
    /// [`LineEditorError::SessionAlreadyActive`], or [`LineEditorError::Io`] when the
    /// pipe or a hook can't be set up. Nothing stays installed on error.
    pub fn install(traps: &SignalTraps) -> Result<Self, LineEditorError> {
        let claim = SessionClaim::try_claim()?;
        let (pipe_read, pipe_write) = mio::net::UnixStream::pair()
            .map_err(LineEditorError::io("creating the signal pipe"))?;
        let blocked = blocked_signals().map_err(LineEditorError::io("reading the signal mask"))?;

        let mut to_unblock = empty_signal_set();
        let mut any_to_unblock = false;
        let mut trapped = Vec::with_capacity(traps.len());
        for trap in traps.iter() {
            let original = Disposition::query(trap.signal)
                .map_err(LineEditorError::io("reading a signal disposition"))?;
            if original.kind() == DispositionKind::Ignore {
                DEBUG_SIGNALS.then(|| tracing::debug!(message = "Not trapping ignored signal", trap.signal));
                continue;
            }
            if is_member(&blocked, trap.signal) {
                if !trap.flags.contains(SignalFlags::UNBLOCK) {
                    continue;
                }
                // SAFETY: `to_unblock` was initialized by sigemptyset.
                unsafe { libc::sigaddset(&raw mut to_unblock, trap.signal) };
                any_to_unblock = true;
            }
            trapped.push(TrappedSignal {
                signal: trap.signal,
                flags: trap.flags,
                original,
                arrived: Arc::new(AtomicBool::new(false)),
                hook_ids: None,
            });
        }

        let mut session = Self {
            trapped,
            pipe_read,
            pipe_write,
            saved_mask: None,
            _claim: claim,
        };

        if any_to_unblock {
            let mut saved = empty_signal_set();
            // SAFETY: both sets are initialized.
            let rc = unsafe {
                libc::pthread_sigmask(libc::SIG_UNBLOCK, &raw const to_unblock, &raw mut saved)
            };
            if rc != 0 {
                return Err(LineEditorError::io("unblocking signals")(
                    io::Error::from_raw_os_error(rc),
                ));
            }
            session.saved_mask = Some(saved);
        }

        session.push_hooks()?;
        DEBUG_SIGNALS.then(|| {
            tracing::debug!(message = "Signal traps installed", count = session.trapped.len());
        });
        Ok(session)
    }

    #[must_use]
    pub fn is_trapped(&self, signal: c_int) -> bool {
        self.trapped.iter().any(|it| it.signal == signal)
    }

    /// The read end of the self-pipe, to wait on.
    #[must_use]
    pub fn pipe_fd(&self) -> RawFd { self.pipe_read.as_raw_fd() }

    /// Empties the self-pipe after it woke the wait.
    pub fn drain_pipe(&mut self) {
        let mut buffer = [0; 64];
        loop {
            match self.pipe_read.read(&mut buffer) {
                Ok(0) => break,
                Ok(_) => {}
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => break,
            }
        }
    }

    /// The next signal that arrived and was not handled yet.
    pub fn take_pending(&mut self) -> Option<c_int> {
        self.trapped
            .iter()
            .find(|it| it.arrived.swap(false, Ordering::SeqCst))
            .map(|it| it.signal)
    }

    /// Puts back the dispositions the signals had when the session was installed,
    /// and removes the editor's hooks.
    pub fn pop_hooks(&mut self) {
        for trapped in &mut self.trapped {
            trapped.unhook();
        }
    }

    /// Hooks the signals again.
    ///
    /// # Errors
    ///
    /// [`LineEditorError::Io`] when a disposition can't be changed or [`signal_hook`]
    /// refuses a registration. Every signal is back to its original disposition then.
    pub fn push_hooks(&mut self) -> Result<(), LineEditorError> {
        let pipe = &self.pipe_write;
        let result = self
            .trapped
            .iter_mut()
            .filter(|it| it.hook_ids.is_none())
            .try_for_each(|trapped| match trapped.hook(pipe) {
                Ok(()) => Ok(()),
                Err(error) => {
                    // Also undoes the ignored placeholder when the registration failed.
                    trapped.unhook();
                    if let Err(error) = trapped.original.install(trapped.signal) {
                        tracing::error!(message = "Failed to restore a signal disposition", trapped.signal, %error);
                    }
                    Err(error)
                }
            });
        if let Err(error) = result {
            self.pop_hooks();
            return Err(LineEditorError::io("registering a signal hook")(error));
        }
        Ok(())
    }

    /// Delivers `signal` to the disposition it had when the session was installed, by
    /// raising it again with that disposition in place and the signal unblocked. See
    /// the module docs.
    pub fn forward(&mut self, signal: c_int) {
        let Some(trapped) = self.trapped.iter().find(|it| it.signal == signal) else {
            return;
        };
        if trapped.flags.contains(SignalFlags::DONT_FORWARD)
            || trapped.original.kind() == DispositionKind::Ignore
        {
            return;
        }
        let original = trapped.original;
        let registry = registry_handler(signal);
        if registry.is_some_and(|it| it.same_handler(&original)) {
            // The host's own registry actions already ran when the signal arrived.
            return;
        }
        let hooked = trapped.hook_ids.is_some();

        DEBUG_SIGNALS.then(|| tracing::debug!(message = "Forwarding signal", signal, ?original));
        let forwarded = (|| -> io::Result<()> {
            if hooked {
                original.install(signal)?;
            }
            let raised = raise_unblocked(signal);
            if hooked && let Some(handler) = registry {
                handler.install(signal)?;
            }
            raised
        })();
        if let Err(error) = forwarded {
            tracing::warn!(message = "Could not forward signal", signal, %error);
        }
    }
}

impl Drop for TrapSession {
    fn drop(&mut self) {
        self.pop_hooks();
        if let Some(saved) = self.saved_mask.take() {
            // SAFETY: `saved` was filled in by pthread_sigmask.
            let rc = unsafe {
                libc::pthread_sigmask(libc::SIG_SETMASK, &raw const saved, std::ptr::null_mut())
            };
            if rc != 0 {
                tracing::error!(message = "Failed to restore the signal mask", rc);
            }
        }
    }
}
