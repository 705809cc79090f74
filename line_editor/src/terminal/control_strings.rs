// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{Capability, TerminalCapabilities};
use crate::{KeySequence, parse_binding_string};
use strum::{EnumCount, IntoEnumIterator};

pub const DEBUG_CONTROL_STRINGS: bool = false;

/// Text attributes that prompts can switch on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextAttribute {
    Bold,
    Underline,
    Standout,
    Blink,
    Reverse,
    Dim,
}

impl TextAttribute {
    pub const ALL: [TextAttribute; 6] = [
        TextAttribute::Bold,
        TextAttribute::Underline,
        TextAttribute::Standout,
        TextAttribute::Blink,
        TextAttribute::Reverse,
        TextAttribute::Dim,
    ];

    #[must_use]
    pub fn capability(self) -> Capability {
        match self {
            TextAttribute::Bold => Capability::Bold,
            TextAttribute::Underline => Capability::Underline,
            TextAttribute::Standout => Capability::Standout,
            TextAttribute::Blink => Capability::Blink,
            TextAttribute::Reverse => Capability::Reverse,
            TextAttribute::Dim => Capability::Dim,
        }
    }
}

/// Resolved control strings for one terminal. An empty string means unsupported, and
/// writing it is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlStrings {
    strings: [Vec<u8>; Capability::COUNT],
    /// Whether the strings came from the capability source (false means ANSI fallback).
    pub from_capabilities: bool,
}

/// Used when the capability source fails or has no data. `Dim` has no fallback.
#[must_use]
pub fn ansi_fallback(capability: Capability) -> &'static [u8] {
    match capability {
        Capability::CursorLeft => b"\x08",
        Capability::CursorRight => b"\x1b[C",
        Capability::CursorUp => b"\x1b[A",
        Capability::CursorDown => b"\n",
        Capability::CarriageReturn => b"\r",
        Capability::ClearToEndOfLine => b"\x1b[K",
        Capability::ClearToEndOfDisplay => b"\x1b[J",
        Capability::ClearScreen => b"\x1b[H\x1b[2J",
        Capability::Bell => b"\x07",
        Capability::Bold => b"\x1b[1m",
        Capability::Underline => b"\x1b[4m",
        Capability::Standout | Capability::Reverse => b"\x1b[7m",
        Capability::Blink => b"\x1b[5m",
        Capability::Dim => b"",
        Capability::AttributesOff => b"\x1b[0m",
        Capability::KeyUp => b"\x1b[A",
        Capability::KeyDown => b"\x1b[B",
        Capability::KeyRight => b"\x1b[C",
        Capability::KeyLeft => b"\x1b[D",
    }
}

impl Default for ControlStrings {
    fn default() -> Self { Self::ansi() }
}

impl ControlStrings {
    /// The fixed ANSI set.
    #[must_use]
    pub fn ansi() -> Self {
        Self {
            strings: std::array::from_fn(|index| {
                Capability::iter()
                    .nth(index)
                    .map(|it| ansi_fallback(it).to_vec())
                    .unwrap_or_default()
            }),
            from_capabilities: false,
        }
    }

    /// Asks `capabilities` for every control string of `term_type`. Any lookup error,
    /// or an answer with no strings at all, gives the ANSI set.
    #[must_use]
    pub fn resolve(capabilities: &dyn TerminalCapabilities, term_type: &str) -> Self {
        let mut strings: [Vec<u8>; Capability::COUNT] = Default::default();
        let mut found_any = false;
        for (index, capability) in Capability::iter().enumerate() {
            match capabilities.control_string(term_type, capability) {
                Ok(Some(bytes)) => {
                    found_any |= !bytes.is_empty();
                    strings[index] = bytes;
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::debug!(message = "Using ANSI control strings", %error);
                    return Self::ansi();
                }
            }
        }
        if !found_any {
            return Self::ansi();
        }
        DEBUG_CONTROL_STRINGS.then(|| tracing::debug!(message = "Resolved control strings", term_type));
        Self {
            strings,
            from_capabilities: true,
        }
    }

    #[must_use]
    pub fn get(&self, capability: Capability) -> &[u8] { &self.strings[capability as usize] }

    #[must_use]
    pub fn has(&self, capability: Capability) -> bool { !self.get(capability).is_empty() }

    #[must_use]
    pub fn attribute(&self, attribute: TextAttribute) -> &[u8] {
        self.get(attribute.capability())
    }

    /// Real key sequences for each symbolic arrow key name: the terminal's own key
    /// string plus both ANSI forms (`ESC [ A` and `ESC O A`).
    #[must_use]
    pub fn arrow_key_sequences(&self) -> Vec<(&'static str, Vec<KeySequence>)> {
        [
            ("up", Capability::KeyUp, "\\E[A", "\\EOA"),
            ("down", Capability::KeyDown, "\\E[B", "\\EOB"),
            ("right", Capability::KeyRight, "\\E[C", "\\EOC"),
            ("left", Capability::KeyLeft, "\\E[D", "\\EOD"),
        ]
        .into_iter()
        .map(|(name, capability, csi, ss3)| {
            let mut sequences: Vec<KeySequence> = [csi, ss3]
                .into_iter()
                .filter_map(|spec| parse_binding_string(spec).ok())
                .collect();
            if self.has(capability) {
                let own = KeySequence::from_key_bytes(self.get(capability));
                if !sequences.contains(&own) {
                    sequences.push(own);
                }
            }
            (name, sequences)
        })
        .collect()
    }
}
