// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use rustix::{fd::BorrowedFd, termios};
use std::env;

pub const DEFAULT_COLUMNS: u16 = 80;
pub const DEFAULT_ROWS: u16 = 24;

/// Terminal size in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub columns: u16,
    pub rows: u16,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
        }
    }
}

impl Size {
    #[must_use]
    pub fn new(columns: u16, rows: u16) -> Self { Self { columns, rows } }

    /// Width as a `usize`, never zero.
    #[must_use]
    pub fn width(self) -> usize { usize::from(self.columns.max(1)) }
}

/// Asks the terminal behind `fd` for its size. Falls back to the `COLUMNS` and `LINES`
/// environment variables, then to 80x24.
#[must_use]
pub fn query_size(fd: Option<BorrowedFd<'_>>) -> Size {
    if let Some(fd) = fd
        && let Ok(winsize) = termios::tcgetwinsize(fd)
        && winsize.ws_col > 0
        && winsize.ws_row > 0
    {
        return Size::new(winsize.ws_col, winsize.ws_row);
    }
    size_from_env()
}

fn size_from_env() -> Size {
    let read = |name: &str| {
        env::var(name)
            .ok()
            .and_then(|it| it.trim().parse::<u16>().ok())
            .filter(|it| *it > 0)
    };
    Size {
        columns: read("COLUMNS").unwrap_or(DEFAULT_COLUMNS),
        rows: read("LINES").unwrap_or(DEFAULT_ROWS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::os::fd::AsFd;

    #[test]
    fn test_non_tty_falls_back() {
        let (left, _right) = std::os::unix::net::UnixStream::pair().unwrap();
        let size = query_size(Some(left.as_fd()));
        assert!(size.columns > 0 && size.rows > 0);
    }

    #[test]
    fn test_width_is_never_zero() {
        assert_eq!(Size::new(0, 0).width(), 1);
        assert_eq!(Size::default().width(), 80);
    }
}
