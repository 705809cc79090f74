// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Host file descriptors watched while the editor waits for terminal input.
//!
//! A host (eg: a server that also talks to sockets) registers a callback per fd and
//! [`FdEventKind`]. The editor waits on those fds together with the terminal, and each
//! time some of them become ready it runs their callbacks before going back to the
//! wait. Callbacks run in priority order ([`FdEventKind`] order, then the order the fds
//! were reported ready). A callback can add or remove watches through its
//! [`FdWatchContext`], in which case the rest of the round is worked out again from the
//! updated list.

use super::LineEditorError;
use mio::Interest;
use std::{fmt::{Debug, Formatter},
          os::fd::RawFd};

pub const DEBUG_FD_WATCH: bool = false;

/// What a host callback waits for. The declaration order is the dispatch priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FdEventKind {
    /// Out of band or priority data.
    Urgent,
    Readable,
    Writable,
}

impl FdEventKind {
    #[must_use]
    pub fn interest(self) -> Interest {
        match self {
            #[cfg(any(target_os = "linux", target_os = "android"))]
            FdEventKind::Urgent => Interest::PRIORITY,
            #[cfg(not(any(target_os = "linux", target_os = "android")))]
            FdEventKind::Urgent => Interest::READABLE,
            FdEventKind::Readable => Interest::READABLE,
            FdEventKind::Writable => Interest::WRITABLE,
        }
    }
}

/// Which kinds of readiness one wait reported for an fd.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FdReadiness {
    pub urgent: bool,
    pub readable: bool,
    pub writable: bool,
}

impl FdReadiness {
    #[must_use]
    pub fn contains(self, kind: FdEventKind) -> bool {
        match kind {
            FdEventKind::Urgent => self.urgent,
            FdEventKind::Readable => self.readable,
            FdEventKind::Writable => self.writable,
        }
    }

    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            urgent: self.urgent || other.urgent,
            readable: self.readable || other.readable,
            writable: self.writable || other.writable,
        }
    }
}

/// What the editor does after a host callback returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdCallbackOutcome {
    /// Keep waiting for terminal input.
    Continue,
    /// The callback wrote to the terminal, so draw the prompt and line again.
    Refresh,
    /// End the read call with [`LineEditorError::FdCallbackAbort`].
    Abort,
}

pub type FdCallback = Box<dyn FnMut(&mut FdWatchContext, RawFd, FdEventKind) -> FdCallbackOutcome>;

enum WatchChange {
    Register(RawFd, FdEventKind, FdCallback),
    Unregister(RawFd, FdEventKind),
}

impl Debug for WatchChange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchChange::Register(fd, kind, _) => write!(f, "Register({fd}, {kind:?})"),
            WatchChange::Unregister(fd, kind) => write!(f, "Unregister({fd}, {kind:?})"),
        }
    }
}

/// Lets a running callback change the watch list. The changes are applied when the
/// callback returns.
#[derive(Debug, Default)]
pub struct FdWatchContext {
    changes: Vec<WatchChange>,
}

impl FdWatchContext {
    pub fn register(
        &mut self,
        fd: RawFd,
        kind: FdEventKind,
        callback: impl FnMut(&mut FdWatchContext, RawFd, FdEventKind) -> FdCallbackOutcome + 'static,
    ) {
        self.changes
            .push(WatchChange::Register(fd, kind, Box::new(callback)));
    }

    pub fn unregister(&mut self, fd: RawFd, kind: FdEventKind) {
        self.changes.push(WatchChange::Unregister(fd, kind));
    }
}

struct FdWatch {
    fd: RawFd,
    kind: FdEventKind,
    callback: FdCallback,
}

impl Debug for FdWatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FdWatch")
            .field("fd", &self.fd)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Result of one [`FdWatchList::dispatch`] round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdDispatchOutcome {
    Continue,
    Refresh,
    Abort(RawFd),
}

/// The registered host watches. At most one callback per fd and kind.
#[derive(Debug, Default)]
pub struct FdWatchList {
    watches: Vec<FdWatch>,
}

impl FdWatchList {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn len(&self) -> usize { self.watches.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.watches.is_empty() }

    /// Adds a watch, replacing the callback of an existing one for the same fd and kind.
    ///
    /// # Errors
    ///
    /// [`LineEditorError::AllocationFailure`], leaving the list as it was.
    pub fn register(
        &mut self,
        fd: RawFd,
        kind: FdEventKind,
        callback: FdCallback,
    ) -> Result<(), LineEditorError> {
        if let Some(watch) = self
            .watches
            .iter_mut()
            .find(|it| it.fd == fd && it.kind == kind)
        {
            watch.callback = callback;
            return Ok(());
        }
        self.watches
            .try_reserve(1)
            .map_err(|_| LineEditorError::AllocationFailure { what: "fd watch list" })?;
        self.watches.push(FdWatch { fd, kind, callback });
        Ok(())
    }

    /// Returns whether a watch was removed.
    pub fn unregister(&mut self, fd: RawFd, kind: FdEventKind) -> bool {
        let before = self.watches.len();
        self.watches.retain(|it| !(it.fd == fd && it.kind == kind));
        before != self.watches.len()
    }

    /// One entry per distinct fd, in registration order, with the union of the
    /// interests of its watches.
    #[must_use]
    pub fn interests(&self) -> Vec<(RawFd, Interest)> {
        let mut acc: Vec<(RawFd, Interest)> = Vec::with_capacity(self.watches.len());
        for watch in &self.watches {
            match acc.iter_mut().find(|(fd, _)| *fd == watch.fd) {
                Some((_, interest)) => *interest = interest.add(watch.kind.interest()),
                None => acc.push((watch.fd, watch.kind.interest())),
            }
        }
        acc
    }

    /// Runs the callbacks of the watches that `ready` reports, see the module docs.
    /// `ready` lists fds in the order the wait found them. `run` wraps each call, so
    /// the caller can adjust the terminal around it.
    pub fn dispatch(
        &mut self,
        ready: &[(RawFd, FdReadiness)],
        run: &mut dyn FnMut(&mut dyn FnMut() -> FdCallbackOutcome) -> FdCallbackOutcome,
    ) -> FdDispatchOutcome {
        let mut done: Vec<(RawFd, FdEventKind)> = vec![];
        let mut refresh = false;

        'round: loop {
            let mut due: Vec<(FdEventKind, usize, RawFd)> = vec![];
            for (order, (fd, readiness)) in ready.iter().enumerate() {
                for watch in self.watches.iter().filter(|it| it.fd == *fd) {
                    if readiness.contains(watch.kind) && !done.contains(&(watch.fd, watch.kind)) {
                        due.push((watch.kind, order, watch.fd));
                    }
                }
            }
            due.sort_unstable();

            for (kind, _, fd) in due {
                let Some(watch) = self
                    .watches
                    .iter_mut()
                    .find(|it| it.fd == fd && it.kind == kind)
                else {
                    continue;
                };
                done.push((fd, kind));

                let mut context = FdWatchContext::default();
                let callback = &mut watch.callback;
                let outcome = run(&mut || callback(&mut context, fd, kind));
                DEBUG_FD_WATCH.then(|| tracing::debug!(message = "Host fd callback", fd, ?kind, ?outcome));

                let changed = !context.changes.is_empty();
                for change in context.changes {
                    match change {
                        WatchChange::Register(fd, kind, callback) => {
                            if let Err(error) = self.register(fd, kind, callback) {
                                tracing::warn!(message = "Could not add fd watch", fd, %error);
                            }
                        }
                        WatchChange::Unregister(fd, kind) => {
                            self.unregister(fd, kind);
                        }
                    }
                }

                match outcome {
                    FdCallbackOutcome::Abort => return FdDispatchOutcome::Abort(fd),
                    FdCallbackOutcome::Refresh => refresh = true,
                    FdCallbackOutcome::Continue => {}
                }
                if changed {
                    continue 'round;
                }
            }
            break;
        }

        if refresh {
            FdDispatchOutcome::Refresh
        } else {
            FdDispatchOutcome::Continue
        }
    }
}
