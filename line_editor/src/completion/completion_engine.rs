// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Word completion.
//!
//! [`CompletionEngine::complete`] hands a [`CandidateSink`] to a host supplied
//! [`Completer`], which decides what "the current word" is and reports every match
//! through [`CandidateSink::add_candidate`]. The engine then reduces the matches:
//!
//! 1. The common suffix is found by sorting on the suffix and comparing the first and
//!    last entries. In a sorted set the two extremes share the shortest common prefix
//!    of all of them.
//! 2. Candidates are sorted by their completion text and adjacent duplicates (same text
//!    and same type suffix) are dropped.
//! 3. The continuation suffix only survives when exactly one candidate is left.

use std::cmp::Ordering;

/// Candidate storage grows in steps of this many entries.
pub const CANDIDATE_GROWTH_INCREMENT: usize = 100;

/// One completion reported by a [`Completer`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionCandidate {
    /// The word before the cursor with `suffix` appended.
    pub completion: String,
    /// What would be inserted at the cursor.
    pub suffix: String,
    /// Shown after the candidate when listing (eg: `/` for directories).
    pub type_suffix: String,
}

/// The reduced outcome of one completion request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionResult {
    /// The longest suffix shared by every candidate.
    pub suffix: String,
    /// Appended after `suffix` when there is a single candidate.
    pub cont_suffix: String,
    /// Sorted and deduplicated.
    pub matches: Vec<CompletionCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum CompletionError {
    #[error("{message}")]
    #[diagnostic(code(r3bl_line_editor::completion::callback))]
    Callback { message: String },

    #[error("word range {word_start}..{word_end} is not valid for a line of {line_len} bytes")]
    #[diagnostic(
        code(r3bl_line_editor::completion::invalid_word_range),
        help("Word offsets must be char boundaries with word_start <= word_end <= line.len()")
    )]
    InvalidWordRange {
        word_start: usize,
        word_end: usize,
        line_len: usize,
    },

    #[error("out of memory while collecting completions")]
    #[diagnostic(code(r3bl_line_editor::completion::allocation_failure))]
    AllocationFailure,
}

impl CompletionError {
    /// Application level failure reported from inside a [`Completer`].
    pub fn callback(message: impl Into<String>) -> Self {
        Self::Callback {
            message: message.into(),
        }
    }
}

/// Host supplied matcher. Invoked once per completion request with the line and the
/// cursor offset, it calls [`CandidateSink::add_candidate`] zero or more times.
///
/// Closures with the same signature implement this trait, and any data they capture
/// plays the part of the callback's opaque data.
pub trait Completer {
    /// # Errors
    ///
    /// Any [`CompletionError`]. The message is kept as the engine's last error.
    fn complete(
        &mut self,
        sink: &mut CandidateSink<'_>,
        line: &str,
        word_end: usize,
    ) -> Result<(), CompletionError>;
}

impl<F> Completer for F
where
    F: FnMut(&mut CandidateSink<'_>, &str, usize) -> Result<(), CompletionError>,
{
    fn complete(
        &mut self,
        sink: &mut CandidateSink<'_>,
        line: &str,
        word_end: usize,
    ) -> Result<(), CompletionError> {
        self(sink, line, word_end)
    }
}

/// Collects candidates during one [`CompletionEngine::complete`] call.
#[derive(Debug)]
pub struct CandidateSink<'a> {
    result: &'a mut CompletionResult,
}

impl CandidateSink<'_> {
    /// Reports one match. The completion text is `line[word_start..word_end]` followed
    /// by `suffix`.
    ///
    /// # Errors
    ///
    /// [`CompletionError::InvalidWordRange`] for offsets outside `line` or not on char
    /// boundaries, [`CompletionError::AllocationFailure`] when storage can't grow.
    pub fn add_candidate(
        &mut self,
        line: &str,
        word_start: usize,
        word_end: usize,
        suffix: &str,
        type_suffix: &str,
        cont_suffix: &str,
    ) -> Result<(), CompletionError> {
        let Some(word) = line.get(word_start..word_end) else {
            return Err(CompletionError::InvalidWordRange {
                word_start,
                word_end,
                line_len: line.len(),
            });
        };

        let matches = &mut self.result.matches;
        if matches.len() == matches.capacity() {
            matches
                .try_reserve_exact(CANDIDATE_GROWTH_INCREMENT)
                .map_err(|_| CompletionError::AllocationFailure)?;
        }

        let mut completion = String::new();
        completion
            .try_reserve_exact(word.len() + suffix.len())
            .map_err(|_| CompletionError::AllocationFailure)?;
        completion.push_str(word);
        completion.push_str(suffix);

        matches.push(CompletionCandidate {
            completion,
            suffix: suffix.to_owned(),
            type_suffix: type_suffix.to_owned(),
        });
        cont_suffix.clone_into(&mut self.result.cont_suffix);
        Ok(())
    }

    /// How many candidates have been reported so far.
    #[must_use]
    pub fn len(&self) -> usize { self.result.matches.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.result.matches.is_empty() }
}

/// See the module docs.
#[derive(Debug, Default)]
pub struct CompletionEngine {
    result: CompletionResult,
    last_error: Option<String>,
}

impl CompletionEngine {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Runs `completer` against `line` with the cursor at `word_end` and returns the
    /// reduced result. The previous result is discarded first.
    ///
    /// # Errors
    ///
    /// Whatever the completer reported. The message is also available from
    /// [`Self::last_error`], and the result is left empty.
    pub fn complete(
        &mut self,
        line: &str,
        word_end: usize,
        completer: &mut dyn Completer,
    ) -> Result<&CompletionResult, CompletionError> {
        self.result = CompletionResult::default();
        self.last_error = None;

        let outcome = {
            let mut sink = CandidateSink {
                result: &mut self.result,
            };
            completer.complete(&mut sink, line, word_end)
        };

        if let Err(error) = outcome {
            self.result = CompletionResult::default();
            self.last_error = Some(error.to_string());
            return Err(error);
        }

        self.reduce();
        Ok(&self.result)
    }

    /// The result of the last successful [`Self::complete`] call.
    #[must_use]
    pub fn result(&self) -> &CompletionResult { &self.result }

    /// The message from the last failed [`Self::complete`] call.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }

    fn reduce(&mut self) {
        let result = &mut self.result;
        if result.matches.is_empty() {
            result.cont_suffix.clear();
            return;
        }

        result.matches.sort_by(|lhs, rhs| lhs.suffix.cmp(&rhs.suffix));
        let first = &result.matches[0].suffix;
        let last = &result.matches[result.matches.len() - 1].suffix;
        result.suffix = common_prefix(first, last).to_owned();

        result.matches.sort_by(|lhs, rhs| match lhs.completion.cmp(&rhs.completion) {
            Ordering::Equal => lhs.type_suffix.cmp(&rhs.type_suffix),
            other => other,
        });
        result.matches.dedup_by(|next, prev| {
            next.completion == prev.completion && next.type_suffix == prev.type_suffix
        });

        if result.matches.len() > 1 {
            result.cont_suffix.clear();
        }
    }
}

/// Longest common prefix of two strings, cut back to a char boundary.
fn common_prefix<'a>(lhs: &'a str, rhs: &str) -> &'a str {
    let mut len = lhs
        .bytes()
        .zip(rhs.bytes())
        .take_while(|(a, b)| a == b)
        .count();
    while !lhs.is_char_boundary(len) {
        len -= 1;
    }
    &lhs[..len]
}
