// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! How edit buffer bytes look on the terminal.
//!
//! | Byte            | Shown as                 | Width                 |
//! |-----------------|--------------------------|-----------------------|
//! | printable ASCII | itself                   | 1                     |
//! | TAB             | spaces to the next stop  | up to [`TAB_WIDTH`]   |
//! | other control   | `^X`                     | 2                     |
//! | DEL             | `^?`                     | 2                     |
//! | 0x80 and above  | `\ooo`                   | 4                     |

use crate::{DEL, is_printable_byte};
use std::io::Write;
use unicode_width::UnicodeWidthStr;

pub const TAB_WIDTH: usize = 8;

/// Columns used by `byte` when drawn starting at terminal `column`.
#[must_use]
pub fn byte_display_width(byte: u8, column: usize) -> usize {
    match byte {
        b'\t' => TAB_WIDTH - column % TAB_WIDTH,
        _ if is_printable_byte(byte) => 1,
        0..=0x1f | DEL => 2,
        _ => 4,
    }
}

/// Columns used by `bytes` drawn starting at terminal `start_column`.
#[must_use]
pub fn bytes_display_width(bytes: &[u8], start_column: usize) -> usize {
    bytes.iter().fold(0, |acc, &byte| {
        acc + byte_display_width(byte, start_column + acc)
    })
}

/// Appends the on-screen form of `byte` drawn at terminal `column`.
pub fn push_displayed_byte(byte: u8, column: usize, acc: &mut Vec<u8>) {
    match byte {
        b'\t' => acc.resize(acc.len() + TAB_WIDTH - column % TAB_WIDTH, b' '),
        _ if is_printable_byte(byte) => acc.push(byte),
        DEL => acc.extend_from_slice(b"^?"),
        0..=0x1f => acc.extend_from_slice(&[b'^', byte | 0x40]),
        _ => {
            let _ = write!(acc, "\\{byte:03o}");
        }
    }
}

/// Columns used by a prompt. ANSI escape sequences take no room, and the rest is
/// measured with Unicode widths.
#[must_use]
pub fn str_display_width(text: &str) -> usize {
    if !text.contains('\x1b') {
        return text.width();
    }
    let stripped = strip_ansi_escapes::strip(text.as_bytes());
    String::from_utf8_lossy(&stripped).width()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(b'a', 0, 1)]
    #[test_case(b'\t', 0, 8)]
    #[test_case(b'\t', 5, 3)]
    #[test_case(b'\t', 8, 8)]
    #[test_case(0x01, 0, 2)]
    #[test_case(DEL, 0, 2)]
    #[test_case(0xe9, 0, 4)]
    fn test_byte_display_width(byte: u8, column: usize, expected: usize) {
        assert_eq!(byte_display_width(byte, column), expected);
        let mut shown = Vec::new();
        push_displayed_byte(byte, column, &mut shown);
        assert_eq!(shown.len(), expected);
    }

    #[test]
    fn test_shown_forms() {
        let mut shown = Vec::new();
        for (column, byte) in [b'x', 0x03, DEL, 0xe9].into_iter().enumerate() {
            push_displayed_byte(byte, column, &mut shown);
        }
        assert_eq!(shown, b"x^C^?\\351");
    }

    #[test]
    fn test_bytes_width_with_tabs() {
        // "ab" then a tab to column 8, then "c".
        assert_eq!(bytes_display_width(b"ab\tc", 0), 9);
        // From column 4 the tab only fills columns 6 and 7.
        assert_eq!(bytes_display_width(b"ab\tc", 4), 5);
    }

    #[test]
    fn test_prompt_width() {
        assert_eq!(str_display_width("> "), 2);
        assert_eq!(str_display_width("\x1b[1m>\x1b[0m "), 2);
        assert_eq!(str_display_width("\u{1f600}> "), 4);
    }
}
