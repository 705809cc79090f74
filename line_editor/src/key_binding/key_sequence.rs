// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Binary key sequences and the human readable binding string syntax.
//!
//! | Written form    | Binary form             |
//! |-----------------|-------------------------|
//! | `^X`, `C-x`     | single control byte     |
//! | `M-x`, `\xF8`   | `ESC` followed by `x`   |
//! | `\E`, `\e`      | `ESC`                   |
//! | `\n`, `\101`    | C escape, octal escape  |
//! | `a` (printable) | `\` marker then `a`     |
//! | `up`, `left`    | stored verbatim         |
//!
//! The `\` marker in front of a printable leading byte keeps single character bindings
//! from ever colliding with the symbolic names in [`SYMBOLIC_KEY_NAMES`]. The editor
//! applies the same rule to live input before it consults the table.

use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter, Write};

pub const ESC: u8 = 0x1b;
pub const DEL: u8 = 0x7f;
pub const PRINTABLE_MARKER: u8 = b'\\';

/// Live input that grows past this many bytes without resolving is abandoned.
pub const MAX_KEY_SEQUENCE_LEN: usize = 64;

/// Names that are stored in the table as-is. The terminal layer binds the real arrow
/// key escape sequences to whatever these names are bound to.
pub const SYMBOLIC_KEY_NAMES: [&str; 4] = ["up", "down", "left", "right"];

pub type KeySequenceBytes = SmallVec<[u8; 8]>;

/// A binary key sequence. Ordering is plain byte-lexicographic, so a pure prefix sorts
/// before every longer sequence that extends it.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeySequence {
    bytes: KeySequenceBytes,
}

#[must_use]
pub fn is_printable_byte(byte: u8) -> bool { (0x20..DEL).contains(&byte) }

#[must_use]
pub fn is_meta_byte(byte: u8) -> bool { byte >= 0x80 }

/// `^?` is DEL, every other character maps to its low five bits.
#[must_use]
pub fn control_byte(byte: u8) -> u8 {
    if byte == b'?' { DEL } else { byte & 0x1f }
}

impl KeySequence {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Wraps raw bytes without any encoding.
    #[must_use]
    pub fn from_raw(bytes: &[u8]) -> Self {
        Self {
            bytes: SmallVec::from_slice(bytes),
        }
    }

    /// Encodes the bytes a key sends (eg: a terminal's cursor key string) with the
    /// printable marker rule, so they match what live input turns into.
    #[must_use]
    pub fn from_key_bytes(bytes: &[u8]) -> Self {
        let mut acc = Self::new();
        if bytes.first().is_some_and(|it| is_printable_byte(*it)) {
            acc.push(PRINTABLE_MARKER);
        }
        acc.bytes.extend_from_slice(bytes);
        acc
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    #[must_use]
    pub fn len(&self) -> usize { self.bytes.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    pub fn push(&mut self, byte: u8) { self.bytes.push(byte); }

    pub fn clear(&mut self) { self.bytes.clear(); }

    #[must_use]
    pub fn starts_with(&self, prefix: &[u8]) -> bool { self.bytes.starts_with(prefix) }

    /// True when the first byte is the `\` marker that precedes a printable key.
    #[must_use]
    pub fn is_printable_leading(&self) -> bool {
        self.bytes.len() >= 2
            && self.bytes[0] == PRINTABLE_MARKER
            && is_printable_byte(self.bytes[1])
    }

    /// The last byte of the sequence, which is the raw key for single key bindings.
    #[must_use]
    pub fn last_byte(&self) -> Option<u8> { self.bytes.last().copied() }

    /// Renders the binary form back into binding string syntax, for logs and error
    /// messages.
    #[must_use]
    pub fn describe(&self) -> String {
        if SYMBOLIC_KEY_NAMES.iter().any(|name| name.as_bytes() == &self.bytes[..]) {
            return String::from_utf8_lossy(&self.bytes).into_owned();
        }
        let bytes = if self.is_printable_leading() {
            &self.bytes[1..]
        } else {
            &self.bytes[..]
        };
        let mut acc = String::new();
        for &byte in bytes {
            match byte {
                ESC => acc.push_str("\\E"),
                DEL => acc.push_str("^?"),
                b'\\' => acc.push_str("\\\\"),
                0..=0x1f => {
                    acc.push('^');
                    acc.push(char::from(byte | 0x40));
                }
                _ if is_printable_byte(byte) => acc.push(char::from(byte)),
                _ => {
                    let _ = write!(acc, "\\{byte:03o}");
                }
            }
        }
        acc
    }
}

impl Display for KeySequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str(&self.describe()) }
}

/// Failure to turn a binding string into a [`KeySequence`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum KeySequenceParseError {
    #[error("empty key sequence")]
    #[diagnostic(code(r3bl_line_editor::key_sequence::empty))]
    Empty,

    #[error("key sequence {spec:?} ends with a lone backslash")]
    #[diagnostic(
        code(r3bl_line_editor::key_sequence::dangling_escape),
        help("Use \\\\ for a literal backslash")
    )]
    DanglingEscape { spec: String },

    #[error("key sequence {spec:?} ends with an incomplete {modifier} modifier")]
    #[diagnostic(code(r3bl_line_editor::key_sequence::incomplete_modifier))]
    IncompleteModifier { spec: String, modifier: &'static str },

    #[error("character {character:?} cannot be expressed as a single byte key")]
    #[diagnostic(
        code(r3bl_line_editor::key_sequence::unrepresentable_char),
        help("Key sequences are made of bytes; use M-x for meta keys")
    )]
    UnrepresentableChar { character: char },
}

/// One decoded key before it is flattened into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ParsedKey {
    byte: u8,
    meta: bool,
}

/// Parses a binding string such as `^X^U`, `M-d`, `\E[A` or `C-?`. Characters above
/// U+00FF cannot be expressed and are rejected; characters in U+0080..=U+00FF are meta
/// keys.
///
/// # Errors
///
/// See [`KeySequenceParseError`].
pub fn parse_binding_string(spec: &str) -> Result<KeySequence, KeySequenceParseError> {
    let mut bytes = Vec::with_capacity(spec.len());
    for character in spec.chars() {
        let Ok(byte) = u8::try_from(u32::from(character)) else {
            return Err(KeySequenceParseError::UnrepresentableChar { character });
        };
        bytes.push(byte);
    }
    parse_binding_bytes(&bytes)
}

/// Byte oriented form of [`parse_binding_string`], used for configuration files.
///
/// # Errors
///
/// See [`KeySequenceParseError`].
pub fn parse_binding_bytes(spec: &[u8]) -> Result<KeySequence, KeySequenceParseError> {
    if spec.is_empty() {
        return Err(KeySequenceParseError::Empty);
    }

    if SYMBOLIC_KEY_NAMES.iter().any(|name| name.as_bytes() == spec) {
        return Ok(KeySequence::from_raw(spec));
    }

    let mut acc = KeySequence::new();
    let mut index = 0;
    while index < spec.len() {
        let (key, next) = parse_key(spec, index)?;
        if key.meta || is_meta_byte(key.byte) {
            acc.push(ESC);
            acc.push(key.byte & 0x7f);
        } else {
            acc.push(key.byte);
        }
        index = next;
    }

    if is_printable_byte(acc.bytes[0]) {
        acc.bytes.insert(0, PRINTABLE_MARKER);
    }

    Ok(acc)
}

fn parse_key(spec: &[u8], index: usize) -> Result<(ParsedKey, usize), KeySequenceParseError> {
    let has_modifier_dash = spec.get(index + 1) == Some(&b'-');
    match spec[index] {
        b'^' if index + 1 < spec.len() => Ok((
            ParsedKey {
                byte: control_byte(spec[index + 1]),
                meta: false,
            },
            index + 2,
        )),
        b'C' | b'M' if has_modifier_dash => {
            let is_control = spec[index] == b'C';
            if index + 2 >= spec.len() {
                return Err(KeySequenceParseError::IncompleteModifier {
                    spec: String::from_utf8_lossy(spec).into_owned(),
                    modifier: if is_control { "C-" } else { "M-" },
                });
            }
            let (inner, next) = parse_key(spec, index + 2)?;
            let key = if is_control {
                ParsedKey {
                    byte: control_byte(inner.byte),
                    meta: inner.meta,
                }
            } else {
                ParsedKey {
                    byte: inner.byte,
                    meta: true,
                }
            };
            Ok((key, next))
        }
        b'\\' => parse_escape(spec, index),
        byte => Ok((ParsedKey { byte, meta: false }, index + 1)),
    }
}

fn parse_escape(spec: &[u8], index: usize) -> Result<(ParsedKey, usize), KeySequenceParseError> {
    let Some(&escaped) = spec.get(index + 1) else {
        return Err(KeySequenceParseError::DanglingEscape {
            spec: String::from_utf8_lossy(spec).into_owned(),
        });
    };

    let plain = |byte: u8, next: usize| Ok((ParsedKey { byte, meta: false }, next));

    match escaped {
        b'E' | b'e' => plain(ESC, index + 2),
        b'n' => plain(b'\n', index + 2),
        b'r' => plain(b'\r', index + 2),
        b't' => plain(b'\t', index + 2),
        b'b' => plain(0x08, index + 2),
        b'f' => plain(0x0c, index + 2),
        b'a' => plain(0x07, index + 2),
        b'v' => plain(0x0b, index + 2),
        b'0'..=b'7' => {
            let mut value: u32 = 0;
            let mut next = index + 1;
            while next < spec.len() && next < index + 4 && (b'0'..=b'7').contains(&spec[next]) {
                value = value * 8 + u32::from(spec[next] - b'0');
                next += 1;
            }
            #[allow(clippy::cast_possible_truncation)]
            plain((value & 0xff) as u8, next)
        }
        other => plain(other, index + 2),
    }
}
