// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod capabilities;
pub mod control_strings;
pub mod crlf_writer;
pub mod display_width;
pub mod term_size;
pub mod terminal_mode;

// Re-export.
pub use capabilities::*;
pub use control_strings::*;
pub use crlf_writer::*;
pub use display_width::*;
pub use term_size::*;
pub use terminal_mode::*;
