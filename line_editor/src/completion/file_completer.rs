// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A [`Completer`] for file and directory names.

use super::{CandidateSink, Completer, CompletionError};
use std::{env, fs, path::PathBuf};

/// Completes the path under the cursor. Spaces in names are escaped with a backslash,
/// a leading `~/` is resolved against `$HOME`, and hidden entries are only offered when
/// the typed name starts with a dot.
///
/// Directories are listed with a `/` type suffix and completed with a `/`
/// continuation, files with a space.
#[derive(Debug, Clone, Default)]
pub struct FileCompleter {
    /// Used instead of the process working directory for relative paths.
    pub base_dir: Option<PathBuf>,
}

impl FileCompleter {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve_dir(&self, dir_part: &str) -> PathBuf {
        if let Some(rest) = dir_part.strip_prefix("~/")
            && let Some(home) = env::var_os("HOME")
        {
            return PathBuf::from(home).join(rest);
        }
        let dir = PathBuf::from(if dir_part.is_empty() { "." } else { dir_part });
        match (&self.base_dir, dir.is_relative()) {
            (Some(base), true) => base.join(dir),
            _ => dir,
        }
    }
}

/// Start of the word ending at `word_end`. A backslash escaped space does not end it.
#[must_use]
pub fn find_word_start(line: &str, word_end: usize) -> usize {
    let bytes = line.as_bytes();
    let mut start = word_end.min(bytes.len());
    while start > 0 {
        let previous = bytes[start - 1];
        let is_escaped = start >= 2 && bytes[start - 2] == b'\\';
        if previous.is_ascii_whitespace() && !is_escaped {
            break;
        }
        start -= 1;
    }
    start
}

fn unescape(word: &str) -> String {
    let mut acc = String::with_capacity(word.len());
    let mut chars = word.chars();
    while let Some(character) = chars.next() {
        match character {
            '\\' => acc.extend(chars.next()),
            other => acc.push(other),
        }
    }
    acc
}

fn escape(name: &str) -> String {
    let mut acc = String::with_capacity(name.len());
    for character in name.chars() {
        if character == ' ' || character == '\\' {
            acc.push('\\');
        }
        acc.push(character);
    }
    acc
}

impl Completer for FileCompleter {
    fn complete(
        &mut self,
        sink: &mut CandidateSink<'_>,
        line: &str,
        word_end: usize,
    ) -> Result<(), CompletionError> {
        let word_start = find_word_start(line, word_end);
        let word = unescape(line.get(word_start..word_end).unwrap_or_default());

        let (dir_part, name_prefix) = match word.rfind('/') {
            Some(slash) => word.split_at(slash + 1),
            None => ("", word.as_str()),
        };
        let dir = self.resolve_dir(dir_part);

        let read_dir = fs::read_dir(&dir).map_err(|error| {
            CompletionError::callback(format!("{}: {error}", dir.display()))
        })?;

        let show_hidden = name_prefix.starts_with('.');
        let mut names: Vec<(String, bool)> = read_dir
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let keep = name.starts_with(name_prefix) && (show_hidden || !name.starts_with('.'));
                // Follow symlinks so a link to a directory completes like one.
                keep.then(|| {
                    let is_dir = fs::metadata(entry.path()).is_ok_and(|it| it.is_dir());
                    (name, is_dir)
                })
            })
            .collect();
        names.sort();

        for (name, is_dir) in names {
            let suffix = escape(&name[name_prefix.len()..]);
            let (type_suffix, cont_suffix) = if is_dir { ("/", "/") } else { ("", " ") };
            sink.add_candidate(line, word_start, word_end, &suffix, type_suffix, cont_suffix)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompletionEngine;
    use pretty_assertions::assert_eq;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("config.toml"), "").unwrap();
        fs::write(dir.path().join("my file.txt"), "").unwrap();
        fs::write(dir.path().join(".hidden"), "").unwrap();
        fs::write(dir.path().join("config").join("app.toml"), "").unwrap();
        dir
    }

    #[test]
    fn test_find_word_start() {
        assert_eq!(find_word_start("cat foo", 7), 4);
        assert_eq!(find_word_start("cat my\\ fi", 10), 4);
        assert_eq!(find_word_start("foo", 3), 0);
        assert_eq!(find_word_start("cat ", 4), 4);
    }

    #[test]
    fn test_directory_and_file_candidates() {
        let dir = fixture();
        let mut completer = FileCompleter::with_base_dir(dir.path());
        let mut engine = CompletionEngine::new();

        let result = engine.complete("edit con", 8, &mut completer).unwrap();
        let listed: Vec<_> = result
            .matches
            .iter()
            .map(|it| format!("{}{}", it.completion, it.type_suffix))
            .collect();
        assert_eq!(listed, vec!["config/", "config.toml"]);
        assert_eq!(result.suffix, "fig");
        assert_eq!(result.cont_suffix, "");
    }

    #[test]
    fn test_single_directory_gets_slash_continuation() {
        let dir = fixture();
        let mut completer = FileCompleter::with_base_dir(dir.path());
        let mut engine = CompletionEngine::new();

        let result = engine.complete("cd config/a", 11, &mut completer).unwrap();
        assert_eq!(result.suffix, "pp.toml");
        assert_eq!(result.cont_suffix, " ");
    }

    #[test]
    fn test_spaces_are_escaped_and_hidden_files_skipped() {
        let dir = fixture();
        let mut completer = FileCompleter::with_base_dir(dir.path());
        let mut engine = CompletionEngine::new();

        let result = engine.complete("rm my", 5, &mut completer).unwrap();
        assert_eq!(result.suffix, "\\ file.txt");

        let result = engine.complete("rm ", 3, &mut completer).unwrap();
        assert!(result.matches.iter().all(|it| !it.completion.starts_with('.')));

        let result = engine.complete("rm .h", 5, &mut completer).unwrap();
        assert_eq!(result.suffix, "idden");
    }

    #[test]
    fn test_missing_directory_reports_last_error() {
        let dir = fixture();
        let mut completer = FileCompleter::with_base_dir(dir.path());
        let mut engine = CompletionEngine::new();

        assert!(engine.complete("ls nope/x", 9, &mut completer).is_err());
        assert!(engine.last_error().is_some_and(|it| it.contains("nope")));
    }
}
