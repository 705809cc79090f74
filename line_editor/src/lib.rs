// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # r3bl_line_editor
//!
//! An embeddable interactive line editor for command line interfaces and telnet style
//! servers. It reads raw terminal input one byte at a time, resolves multi byte key
//! sequences through a layered [`KeyBindingTable`], dispatches them to editing actions
//! ([`EditAction`]), and renders the edited line back to the output stream.
//!
//! The main parts are:
//!
//! 1. [`KeyBindingTable`]: a sorted table of binary key sequences with three override
//!    layers (user, terminal, default). See [`parse_binding_string`] for the human
//!    readable form (`^X`, `C-x`, `M-x`, `\E`, octal escapes).
//! 2. [`CompletionEngine`]: collects candidates reported by a [`Completer`] callback,
//!    reduces them to a common suffix, sorts and dedups them, and lists them in
//!    columns.
//! 3. [`LineEditor`]: the editor state machine. Emacs and vi modes, vi undo and repeat
//!    change, history recall through a [`HistoryStore`], signal safe raw mode, host fd
//!    multiplexing ([`LineEditor::register_fd_interest`]), and a one byte at a time
//!    incremental mode ([`LineEditor::read_line_incremental`]).
//!
//! # Example
//!
//! ```no_run
//! use r3bl_line_editor::{LineEditor, LineEditorConfig, ReadLineEvent};
//!
//! # fn main() -> miette::Result<()> {
//! let mut editor = LineEditor::try_new_terminal(LineEditorConfig::default())?;
//! loop {
//!     match editor.read_line("> ", None, None)? {
//!         ReadLineEvent::Line(line) => println!("got: {line}"),
//!         ReadLineEvent::Eof => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// https://github.com/rust-lang/rust-clippy
// https://rust-lang.github.io/rust-clippy/master/index.html
#![warn(clippy::all)]
#![warn(rust_2018_idioms)]
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach sources.
pub mod completion;
pub mod editor;
pub mod key_binding;
pub mod log;
pub mod terminal;
pub mod test_fixtures;

// Re-export.
#[allow(ambiguous_glob_reexports)]
pub use completion::*;
#[allow(ambiguous_glob_reexports)]
pub use editor::*;
pub use key_binding::*;
pub use log::*;
pub use terminal::*;
pub use test_fixtures::*;
