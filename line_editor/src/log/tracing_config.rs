// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::PathBuf;
use tracing_core::LevelFilter;

/// Default log file used by [`TracingConfig::new_file`].
pub const DEFAULT_LOG_FILE_NAME: &str = "line_editor_log.txt";

/// Where the logs go and at which level.
///
/// The editor owns the terminal while a line is read, so logging to stdout corrupts
/// the display. Prefer [`WriterConfig::File`] for interactive programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level: tracing::Level,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    File(PathBuf),
    DisplayAndFile(DisplayPreference, PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

impl TracingConfig {
    /// Logs to `path` (or [`DEFAULT_LOG_FILE_NAME`]) at `DEBUG`.
    #[must_use]
    pub fn new_file(path: Option<PathBuf>) -> Self {
        Self {
            writer_config: WriterConfig::File(
                path.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE_NAME)),
            ),
            level: tracing::Level::DEBUG,
        }
    }

    #[must_use]
    pub fn new_display(preferred_display: DisplayPreference) -> Self {
        Self {
            writer_config: WriterConfig::Display(preferred_display),
            level: tracing::Level::DEBUG,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { LevelFilter::from_level(self.level) }

    #[must_use]
    pub fn display_preference(&self) -> Option<DisplayPreference> {
        match self.writer_config {
            WriterConfig::Display(it) | WriterConfig::DisplayAndFile(it, _) => Some(it),
            WriterConfig::None | WriterConfig::File(_) => None,
        }
    }

    #[must_use]
    pub fn file_path(&self) -> Option<&PathBuf> {
        match &self.writer_config {
            WriterConfig::File(it) | WriterConfig::DisplayAndFile(_, it) => Some(it),
            WriterConfig::None | WriterConfig::Display(_) => None,
        }
    }
}
