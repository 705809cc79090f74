// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The terminal capability collaborator.
//!
//! The editor never parses terminfo. It asks a [`TerminalCapabilities`] implementation
//! for named control strings, and [`crate::ControlStrings::resolve`] falls back to
//! plain ANSI sequences when the lookup fails or yields nothing.
//! [`BuiltinCapabilities`] knows a handful of common terminal families.

use super::Size;
use strum_macros::{EnumCount, EnumIter};

/// A named control string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum Capability {
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CarriageReturn,
    ClearToEndOfLine,
    ClearToEndOfDisplay,
    ClearScreen,
    Bell,
    Bold,
    Underline,
    Standout,
    Blink,
    Reverse,
    Dim,
    AttributesOff,
    KeyUp,
    KeyDown,
    KeyLeft,
    KeyRight,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum CapabilityLookupError {
    #[error("no capability data for terminal type {term_type:?}")]
    #[diagnostic(
        code(r3bl_line_editor::capabilities::unknown_terminal),
        help("ANSI escape sequences will be used instead")
    )]
    UnknownTerminal { term_type: String },

    #[error("capability lookup failed: {message}")]
    #[diagnostic(code(r3bl_line_editor::capabilities::lookup_failed))]
    LookupFailed { message: String },
}

/// Source of control strings for a terminal type.
pub trait TerminalCapabilities: std::fmt::Debug + Send {
    /// `Ok(None)` means the terminal does not support `capability`.
    ///
    /// # Errors
    ///
    /// When nothing is known about `term_type`, or the lookup itself failed.
    fn control_string(
        &self,
        term_type: &str,
        capability: Capability,
    ) -> Result<Option<Vec<u8>>, CapabilityLookupError>;

    /// Lines and columns, when the collaborator can tell.
    fn size(&self) -> Option<Size> { None }
}

/// Built-in table for common terminal families.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCapabilities;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermFamily {
    Dumb,
    Vt100,
    Linux,
    Xterm,
}

fn term_family(term_type: &str) -> Option<TermFamily> {
    const XTERM_LIKE: [&str; 8] = [
        "xterm", "screen", "tmux", "rxvt", "alacritty", "kitty", "foot", "wezterm",
    ];
    if term_type == "dumb" {
        Some(TermFamily::Dumb)
    } else if term_type.starts_with("vt1") || term_type.starts_with("vt2") {
        Some(TermFamily::Vt100)
    } else if term_type == "linux" {
        Some(TermFamily::Linux)
    } else if XTERM_LIKE.iter().any(|it| term_type.starts_with(it)) {
        Some(TermFamily::Xterm)
    } else {
        None
    }
}

impl TerminalCapabilities for BuiltinCapabilities {
    fn control_string(
        &self,
        term_type: &str,
        capability: Capability,
    ) -> Result<Option<Vec<u8>>, CapabilityLookupError> {
        let Some(family) = term_family(term_type) else {
            return Err(CapabilityLookupError::UnknownTerminal {
                term_type: term_type.to_owned(),
            });
        };

        let bytes: Option<&[u8]> = match (family, capability) {
            (_, Capability::CursorLeft) => Some(b"\x08"),
            (_, Capability::CursorDown) => Some(b"\n"),
            (_, Capability::CarriageReturn) => Some(b"\r"),
            (_, Capability::Bell) => Some(b"\x07"),
            (TermFamily::Dumb, _) => None,
            (_, Capability::CursorRight) => Some(b"\x1b[C"),
            (_, Capability::CursorUp) => Some(b"\x1b[A"),
            (_, Capability::ClearToEndOfLine) => Some(b"\x1b[K"),
            (_, Capability::ClearToEndOfDisplay) => Some(b"\x1b[J"),
            (_, Capability::ClearScreen) => Some(b"\x1b[H\x1b[2J"),
            (_, Capability::Bold) => Some(b"\x1b[1m"),
            (_, Capability::Underline) => Some(b"\x1b[4m"),
            (_, Capability::Standout | Capability::Reverse) => Some(b"\x1b[7m"),
            (_, Capability::Blink) => Some(b"\x1b[5m"),
            (TermFamily::Vt100, Capability::Dim) => None,
            (_, Capability::Dim) => Some(b"\x1b[2m"),
            (_, Capability::AttributesOff) => Some(b"\x1b[0m"),
            (TermFamily::Linux, Capability::KeyUp) => Some(b"\x1b[A"),
            (TermFamily::Linux, Capability::KeyDown) => Some(b"\x1b[B"),
            (TermFamily::Linux, Capability::KeyRight) => Some(b"\x1b[C"),
            (TermFamily::Linux, Capability::KeyLeft) => Some(b"\x1b[D"),
            (_, Capability::KeyUp) => Some(b"\x1bOA"),
            (_, Capability::KeyDown) => Some(b"\x1bOB"),
            (_, Capability::KeyRight) => Some(b"\x1bOC"),
            (_, Capability::KeyLeft) => Some(b"\x1bOD"),
        };
        Ok(bytes.map(<[u8]>::to_vec))
    }
}
