// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The closed set of editing actions that a key sequence can be bound to.
//!
//! Every variant has a stable kebab-case name (eg: `backward-delete-char`) which is
//! what configuration files and [`crate::LineEditor::bind`] use. The mapping between
//! names and variants is derived with [`strum_macros`], and [`crate::LineEditor`]
//! dispatches them with an exhaustive `match`.

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// An editing action. See the module docs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum EditAction {
    // Cursor motion.
    CursorLeft,
    CursorRight,
    BeginningOfLine,
    EndOfLine,
    ForwardWord,
    BackwardWord,
    ViForwardWord,
    ViBackwardWord,
    GotoColumn,
    ForwardFindChar,
    BackwardFindChar,
    ForwardToChar,
    BackwardToChar,
    RepeatFindChar,
    InvertRefindChar,

    // Deletion and the cut buffer.
    ForwardDeleteChar,
    BackwardDeleteChar,
    ForwardDeleteWord,
    BackwardDeleteWord,
    KillLine,
    BackwardKillLine,
    DeleteLine,
    SetMark,
    ExchangePointAndMark,
    KillRegion,
    CopyRegionAsKill,
    Yank,
    AppendYank,

    // Transforms.
    UpcaseWord,
    DowncaseWord,
    CapitalizeWord,
    ChangeCase,
    TransposeChars,
    InsertMode,
    LiteralNext,

    // Display.
    Redisplay,
    ClearScreen,
    RingBell,

    // History.
    UpHistory,
    DownHistory,
    HistorySearchBackward,
    HistorySearchForward,
    BeginningOfHistory,
    EndOfHistory,

    // Completion.
    CompleteWord,
    ListOrEof,
    DelCharOrListOrEof,

    // Session control.
    Newline,
    UserInterrupt,
    Suspend,
    ReadInitFiles,
    DigitArgument,
    EmacsMode,
    ViMode,

    // Vi.
    ViCommandMode,
    ViInsert,
    ViOverwrite,
    ViInsertAtBol,
    ViAppend,
    ViAppendAtEol,
    ViReplaceChar,
    ViForwardChangeChar,
    ViBackwardChangeChar,
    ViForwardChangeWord,
    ViBackwardChangeWord,
    ViChangeRestOfLine,
    ViChangeLine,
    ViChangeToBol,
    ViUndo,
    ViRepeatChange,
    ViDeleteLine,
}

impl EditAction {
    /// Looks up an action by its kebab-case name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> { name.parse().ok() }

    /// The kebab-case name used in configuration files.
    #[must_use]
    pub fn name(self) -> &'static str { self.into() }

    /// Actions that mutate the edit buffer. Only these are recorded as the "last
    /// change" that [`EditAction::ViRepeatChange`] replays.
    #[must_use]
    pub fn is_change(self) -> bool {
        matches!(
            self,
            EditAction::ForwardDeleteChar
                | EditAction::BackwardDeleteChar
                | EditAction::ForwardDeleteWord
                | EditAction::BackwardDeleteWord
                | EditAction::KillLine
                | EditAction::BackwardKillLine
                | EditAction::DeleteLine
                | EditAction::KillRegion
                | EditAction::Yank
                | EditAction::AppendYank
                | EditAction::UpcaseWord
                | EditAction::DowncaseWord
                | EditAction::CapitalizeWord
                | EditAction::ChangeCase
                | EditAction::TransposeChars
                | EditAction::ViInsert
                | EditAction::ViOverwrite
                | EditAction::ViInsertAtBol
                | EditAction::ViAppend
                | EditAction::ViAppendAtEol
                | EditAction::ViReplaceChar
                | EditAction::ViForwardChangeChar
                | EditAction::ViBackwardChangeChar
                | EditAction::ViForwardChangeWord
                | EditAction::ViBackwardChangeWord
                | EditAction::ViChangeRestOfLine
                | EditAction::ViChangeLine
                | EditAction::ViChangeToBol
                | EditAction::ViDeleteLine
        )
    }

    /// Actions that consume the next input byte as their argument (the character to
    /// find, the replacement character, or the byte to insert literally).
    #[must_use]
    pub fn takes_char_argument(self) -> bool {
        matches!(
            self,
            EditAction::ForwardFindChar
                | EditAction::BackwardFindChar
                | EditAction::ForwardToChar
                | EditAction::BackwardToChar
                | EditAction::ViReplaceChar
                | EditAction::LiteralNext
        )
    }
}
