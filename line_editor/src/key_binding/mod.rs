// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod default_bindings;
pub mod edit_action;
pub mod key_sequence;
pub mod key_table;

// Re-export.
pub use default_bindings::*;
pub use edit_action::*;
pub use key_sequence::*;
pub use key_table::*;
