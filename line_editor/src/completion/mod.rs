// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod completion_engine;
pub mod file_completer;
pub mod list_completions;

// Re-export.
pub use completion_engine::*;
pub use file_completer::*;
pub use list_completions::*;
