// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod edit_buffer;
pub mod editor_state;
pub mod error;
pub mod fd_watch;
pub mod history;
pub mod input;
pub mod line_editor;
pub mod prompt;
pub mod render;
pub mod signals;
pub mod vi_state;

#[cfg(test)]
mod integration_tests;

// Re-export.
pub use edit_buffer::*;
pub use editor_state::*;
pub use error::*;
pub use fd_watch::*;
pub use history::*;
pub use input::*;
pub use line_editor::*;
pub use prompt::*;
pub use render::*;
pub use signals::*;
pub use vi_state::*;
