// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`LineEditor`] is split across these files, each adding an `impl LineEditor` block:
//! - `core`: construction, configuration and bindings.
//! - `ingest` and `dispatch`: input bytes to key sequences to actions.
//! - `motion`, `edit`, `recall`, `completion`, `vi`: the actions.
//! - `session`: the blocking and incremental read calls, signals and host fds.
//! - `config_file`: configuration files.

// Attach sources.
mod completion;
mod config_file;
mod core;
mod dispatch;
mod edit;
mod ingest;
mod motion;
mod recall;
mod session;
mod vi;

// Re-export.
pub use config_file::*;
pub use core::*;
pub(crate) use dispatch::{ActionArgs, Flow};
