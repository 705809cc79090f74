// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Built-in emacs and vi binding sets, installed into [`BindingLayer::Default`].
//!
//! Vi command mode bindings are written with a leading `\E`, since the editor prefixes
//! an implicit escape to every key typed in command mode. The bare `^[` binding must be
//! installed before any `\E...` binding, otherwise it would be rejected as a prefix of
//! them.

use super::{BindingLayer, EditAction, KeyBindingTable, KeySequence, KeyTableError,
            parse_binding_string};

/// Which built-in binding set is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditMode {
    #[cfg_attr(feature = "emacs", default)]
    Emacs,
    #[cfg_attr(not(feature = "emacs"), default)]
    Vi,
    /// No default bindings at all.
    None,
}

impl EditMode {
    /// Parses the `edit-mode` configuration argument.
    #[must_use]
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "emacs" => Some(EditMode::Emacs),
            "vi" => Some(EditMode::Vi),
            "none" => Some(EditMode::None),
            _ => None,
        }
    }
}

use EditAction::{AppendYank, BackwardDeleteChar, BackwardDeleteWord, BackwardFindChar,
                 BackwardKillLine, BackwardToChar, BackwardWord, BeginningOfHistory,
                 BeginningOfLine, CapitalizeWord, ChangeCase, ClearScreen, CompleteWord,
                 CopyRegionAsKill, CursorLeft, CursorRight, DelCharOrListOrEof,
                 DigitArgument, DownHistory, DowncaseWord, EmacsMode, EndOfHistory,
                 EndOfLine, ExchangePointAndMark, ForwardDeleteChar, ForwardDeleteWord,
                 ForwardFindChar, ForwardToChar, ForwardWord, GotoColumn,
                 HistorySearchBackward, HistorySearchForward, InvertRefindChar,
                 KillLine, KillRegion, ListOrEof, LiteralNext, Newline, ReadInitFiles,
                 Redisplay, RepeatFindChar, RingBell, SetMark, Suspend, TransposeChars,
                 UpHistory, UpcaseWord, UserInterrupt, ViAppend, ViAppendAtEol,
                 ViBackwardChangeChar, ViBackwardChangeWord, ViBackwardWord, ViChangeLine,
                 ViChangeRestOfLine, ViChangeToBol, ViCommandMode, ViDeleteLine,
                 ViForwardChangeChar, ViForwardChangeWord, ViForwardWord, ViInsert,
                 ViInsertAtBol, ViMode, ViOverwrite, ViRepeatChange, ViReplaceChar,
                 ViUndo, Yank};

/// Symbolic names. The terminal layer maps real arrow keys onto these.
const ARROW_KEY_BINDINGS: &[(&str, EditAction)] = &[
    ("up", UpHistory),
    ("down", DownHistory),
    ("left", CursorLeft),
    ("right", CursorRight),
];

pub const EMACS_BINDINGS: &[(&str, EditAction)] = &[
    ("^@", SetMark),
    ("^A", BeginningOfLine),
    ("^B", CursorLeft),
    ("^C", UserInterrupt),
    ("^D", DelCharOrListOrEof),
    ("^E", EndOfLine),
    ("^F", CursorRight),
    ("^G", RingBell),
    ("^H", BackwardDeleteChar),
    ("^I", CompleteWord),
    ("^J", Newline),
    ("^K", KillLine),
    ("^L", ClearScreen),
    ("^M", Newline),
    ("^N", DownHistory),
    ("^P", UpHistory),
    ("^R", Redisplay),
    ("^T", TransposeChars),
    ("^U", BackwardKillLine),
    ("^V", LiteralNext),
    ("^W", KillRegion),
    ("^X^R", ReadInitFiles),
    ("^X^U", ViUndo),
    ("^X^V", ViMode),
    ("^X^X", ExchangePointAndMark),
    ("^Y", Yank),
    ("^Z", Suspend),
    ("^]", ForwardFindChar),
    ("^_", ViUndo),
    ("^?", BackwardDeleteChar),
    ("M-^]", BackwardFindChar),
    ("M-^H", BackwardDeleteWord),
    ("M-^?", BackwardDeleteWord),
    ("M-b", BackwardWord),
    ("M-c", CapitalizeWord),
    ("M-d", ForwardDeleteWord),
    ("M-f", ForwardWord),
    ("M-l", DowncaseWord),
    ("M-n", HistorySearchForward),
    ("M-p", HistorySearchBackward),
    ("M-u", UpcaseWord),
    ("M-w", CopyRegionAsKill),
    ("M-<", BeginningOfHistory),
    ("M->", EndOfHistory),
    ("M-0", DigitArgument),
    ("M-1", DigitArgument),
    ("M-2", DigitArgument),
    ("M-3", DigitArgument),
    ("M-4", DigitArgument),
    ("M-5", DigitArgument),
    ("M-6", DigitArgument),
    ("M-7", DigitArgument),
    ("M-8", DigitArgument),
    ("M-9", DigitArgument),
];

pub const VI_BINDINGS: &[(&str, EditAction)] = &[
    // Must come first, see the module docs.
    ("^[", ViCommandMode),
    // Insert mode.
    ("^C", UserInterrupt),
    ("^D", ListOrEof),
    ("^H", BackwardDeleteChar),
    ("^I", CompleteWord),
    ("^J", Newline),
    ("^L", ClearScreen),
    ("^M", Newline),
    ("^R", Redisplay),
    ("^U", BackwardKillLine),
    ("^V", LiteralNext),
    ("^W", BackwardDeleteWord),
    ("^X^E", EmacsMode),
    ("^Z", Suspend),
    ("^?", BackwardDeleteChar),
    // Command mode.
    ("\\E^C", UserInterrupt),
    ("\\E^D", ListOrEof),
    ("\\E^H", CursorLeft),
    ("\\E^I", CompleteWord),
    ("\\E^J", Newline),
    ("\\E^L", ClearScreen),
    ("\\E^M", Newline),
    ("\\E^R", Redisplay),
    ("\\E^Z", Suspend),
    ("\\E^?", CursorLeft),
    ("\\E ", CursorRight),
    ("\\E$", EndOfLine),
    ("\\E+", DownHistory),
    ("\\E,", InvertRefindChar),
    ("\\E-", UpHistory),
    ("\\E.", ViRepeatChange),
    ("\\E0", BeginningOfLine),
    ("\\E1", DigitArgument),
    ("\\E2", DigitArgument),
    ("\\E3", DigitArgument),
    ("\\E4", DigitArgument),
    ("\\E5", DigitArgument),
    ("\\E6", DigitArgument),
    ("\\E7", DigitArgument),
    ("\\E8", DigitArgument),
    ("\\E9", DigitArgument),
    ("\\E;", RepeatFindChar),
    ("\\EA", ViAppendAtEol),
    ("\\EC", ViChangeRestOfLine),
    ("\\ED", KillLine),
    ("\\EF", BackwardFindChar),
    ("\\EI", ViInsertAtBol),
    ("\\EP", Yank),
    ("\\ER", ViOverwrite),
    ("\\ES", ViChangeLine),
    ("\\ET", BackwardToChar),
    ("\\EX", BackwardDeleteChar),
    ("\\E^", BeginningOfLine),
    ("\\Ea", ViAppend),
    ("\\Eb", ViBackwardWord),
    ("\\Ec$", ViChangeRestOfLine),
    ("\\Ec0", ViChangeToBol),
    ("\\Ecb", ViBackwardChangeWord),
    ("\\Ecc", ViChangeLine),
    ("\\Ech", ViBackwardChangeChar),
    ("\\Ecl", ViForwardChangeChar),
    ("\\Ecw", ViForwardChangeWord),
    ("\\Ed$", KillLine),
    ("\\Ed0", BackwardKillLine),
    ("\\Edb", BackwardDeleteWord),
    ("\\Edd", ViDeleteLine),
    ("\\Edw", ForwardDeleteWord),
    ("\\Ee", ForwardWord),
    ("\\Ef", ForwardFindChar),
    ("\\Eh", CursorLeft),
    ("\\Ei", ViInsert),
    ("\\Ej", DownHistory),
    ("\\Ek", UpHistory),
    ("\\El", CursorRight),
    ("\\Ep", AppendYank),
    ("\\Er", ViReplaceChar),
    ("\\Es", ViForwardChangeChar),
    ("\\Et", ForwardToChar),
    ("\\Eu", ViUndo),
    ("\\Ew", ViForwardWord),
    ("\\Ex", ForwardDeleteChar),
    ("\\E|", GotoColumn),
    ("\\E~", ChangeCase),
];

/// Replaces the default layer with the binding set for `mode`. Returns the number of
/// bindings installed.
///
/// # Errors
///
/// Propagates [`KeyTableError`] from the table. Bindings installed before the failure
/// stay in place.
pub fn install_default_bindings(
    table: &mut KeyBindingTable,
    mode: EditMode,
) -> Result<usize, KeyTableError> {
    table.clear_layer(BindingLayer::Default);

    let bindings: &[(&str, EditAction)] = match mode {
        EditMode::Emacs => EMACS_BINDINGS,
        EditMode::Vi => VI_BINDINGS,
        EditMode::None => return Ok(0),
    };

    let mut count = 0;
    for (spec, action) in bindings.iter().chain(ARROW_KEY_BINDINGS) {
        let Ok(sequence) = parse_binding_string(spec) else {
            tracing::warn!(message = "Invalid built-in binding", spec);
            continue;
        };
        table.bind(BindingLayer::Default, &sequence, Some(*action))?;
        count += 1;
    }
    Ok(count)
}

/// Binds each real key sequence in the terminal layer to whatever action its symbolic
/// name (eg: `up`) currently resolves to. Names that are unbound remove the terminal
/// bindings. Sequences that would shadow longer bindings are skipped.
pub fn bind_arrow_keys<'a>(
    table: &mut KeyBindingTable,
    arrow_keys: impl IntoIterator<Item = (&'a str, &'a [KeySequence])>,
) {
    for (name, sequences) in arrow_keys {
        let action = table.action_for(name.as_bytes());
        for sequence in sequences {
            if let Err(error) = table.bind(BindingLayer::Terminal, sequence, action) {
                tracing::debug!(message = "Skipped arrow key binding", name, %sequence, %error);
            }
        }
    }
}
