// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Configuration files.
//!
//! One directive per line:
//!
//! ```text
//! # Comments start with '#'.
//! bind ^X^K kill-line
//! bind M-d          # no action: removes the user binding
//! edit-mode vi
//! nobeep
//! ```
//!
//! Arguments are separated by whitespace. A backslash keeps the next character in the
//! argument (so `\ ` is a space inside a key sequence), and a backslash at the end of
//! a line joins it with the next one. A bad line is reported and skipped, the rest of
//! the file still applies.

use crate::{BindingLayer, EditMode, LineEditor, LineEditorError};
use std::path::{Path, PathBuf};

/// What loading a configuration source did.
#[derive(Debug, Default)]
pub struct ConfigLoadReport {
    pub source_name: String,
    /// Directives that were applied.
    pub applied: usize,
    /// One [`LineEditorError::ConfigurationSyntax`] per rejected line.
    pub errors: Vec<LineEditorError>,
}

impl ConfigLoadReport {
    #[must_use]
    pub fn is_clean(&self) -> bool { self.errors.is_empty() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Directive {
    line_number: usize,
    tokens: Vec<Vec<u8>>,
}

/// Splits `text` into directives. See the module docs for the syntax.
fn tokenize(text: &[u8]) -> Vec<Directive> {
    let mut directives = vec![];
    let mut line_number = 1;
    let mut current = Directive {
        line_number,
        tokens: vec![],
    };
    let mut token: Option<Vec<u8>> = None;
    let mut in_comment = false;

    let mut index = 0;
    while index < text.len() {
        let byte = text[index];
        index += 1;

        if byte == b'\n' {
            current.tokens.extend(token.take());
            line_number += 1;
            let finished = std::mem::replace(
                &mut current,
                Directive {
                    line_number,
                    tokens: vec![],
                },
            );
            if !finished.tokens.is_empty() {
                directives.push(finished);
            }
            in_comment = false;
            continue;
        }
        if in_comment {
            continue;
        }

        match byte {
            b'\\' => match text.get(index) {
                Some(b'\n') => {
                    current.tokens.extend(token.take());
                    line_number += 1;
                    index += 1;
                }
                // Kept as is, the key sequence parser decodes it.
                Some(&escaped) => {
                    token
                        .get_or_insert_with(Vec::new)
                        .extend_from_slice(&[b'\\', escaped]);
                    index += 1;
                }
                None => token.get_or_insert_with(Vec::new).push(b'\\'),
            },
            b'#' if token.is_none() => in_comment = true,
            _ if byte.is_ascii_whitespace() => current.tokens.extend(token.take()),
            _ => token.get_or_insert_with(Vec::new).push(byte),
        }
    }

    current.tokens.extend(token.take());
    if !current.tokens.is_empty() {
        directives.push(current);
    }
    directives
}

/// `~/` at the start of `path` stands for `$HOME`.
#[must_use]
pub fn expand_home_dir(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

impl LineEditor {
    /// Applies the configuration file at `path` (`~/` is expanded) and remembers it
    /// for the `read-init-files` action.
    ///
    /// # Errors
    ///
    /// [`LineEditorError::Io`] when the file can't be read. Problems inside the file
    /// are in the returned report instead.
    pub fn load_config_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<ConfigLoadReport, LineEditorError> {
        let path = expand_home_dir(path.as_ref());
        let text = std::fs::read(&path)
            .map_err(LineEditorError::io("reading the configuration file"))?;
        let report = self.load_config_bytes(&path.display().to_string(), &text);
        self.init_file = Some(path);
        Ok(report)
    }

    /// Applies configuration text. `source_name` only shows up in error messages.
    pub fn load_config_str(&mut self, source_name: &str, text: &str) -> ConfigLoadReport {
        self.load_config_bytes(source_name, text.as_bytes())
    }

    fn load_config_bytes(&mut self, source_name: &str, text: &[u8]) -> ConfigLoadReport {
        let mut report = ConfigLoadReport {
            source_name: source_name.to_owned(),
            ..Default::default()
        };

        for directive in tokenize(text) {
            match self.apply_directive(&directive.tokens) {
                Ok(()) => report.applied += 1,
                Err(error) => {
                    tracing::warn!(
                        message = "Skipped configuration line",
                        source_name,
                        line_number = directive.line_number,
                        %error
                    );
                    let message = match error {
                        LineEditorError::ConfigurationSyntax { message, .. } => message,
                        other => other.to_string(),
                    };
                    report.errors.push(LineEditorError::ConfigurationSyntax {
                        source_name: source_name.to_owned(),
                        line_number: directive.line_number,
                        message,
                    });
                }
            }
        }
        report
    }

    fn apply_directive(&mut self, tokens: &[Vec<u8>]) -> Result<(), LineEditorError> {
        let syntax_error = |message: String| LineEditorError::ConfigurationSyntax {
            source_name: String::new(),
            line_number: 0,
            message,
        };
        let Some((command, args)) = tokens.split_first() else {
            return Ok(());
        };

        match (command.as_slice(), args) {
            (b"bind", [sequence]) => {
                self.bind_bytes(BindingLayer::User, sequence, None)?;
            }
            (b"bind", [sequence, action]) => {
                let action = String::from_utf8_lossy(action);
                self.bind_bytes(BindingLayer::User, sequence, Some(action.as_ref()))?;
            }
            (b"edit-mode", [mode]) => {
                let mode = String::from_utf8_lossy(mode);
                let Some(mode) = EditMode::from_config_name(&mode) else {
                    return Err(syntax_error(format!(
                        "unknown edit mode {mode:?}, expected emacs, vi or none"
                    )));
                };
                self.set_edit_mode(mode)?;
            }
            (b"nobeep", []) => self.config.bell_enabled = false,
            (b"bind", _) => {
                return Err(syntax_error(
                    "bind takes a key sequence and an optional action".to_owned(),
                ));
            }
            (b"edit-mode" | b"nobeep", _) => {
                return Err(syntax_error(format!(
                    "wrong number of arguments for {}",
                    String::from_utf8_lossy(command)
                )));
            }
            _ => {
                return Err(syntax_error(format!(
                    "unknown directive {:?}",
                    String::from_utf8_lossy(command)
                )));
            }
        }
        Ok(())
    }

    /// The `read-init-files` action. Problems are logged, editing goes on.
    pub(crate) fn read_init_files(&mut self) {
        let Some(path) = self.init_file.clone() else {
            tracing::debug!(message = "read-init-files: no configuration file was loaded");
            return;
        };
        match self.load_config_file(&path) {
            Ok(report) => {
                tracing::debug!(message = "Reloaded configuration", ?path, report.applied);
            }
            Err(error) => tracing::warn!(message = "Could not reload configuration", ?path, %error),
        }
    }
}
