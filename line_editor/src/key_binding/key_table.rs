// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Sorted key binding table with three override layers.
//!
//! Entries are kept sorted by their binary [`KeySequence`]. Since byte-lexicographic
//! order puts a prefix before everything that extends it, all bindings that share a
//! prefix form one contiguous run that starts at the prefix's insertion point. That is
//! what [`KeyBindingTable::lookup`] reports as [`KeyLookup::Ambiguous`].
//!
//! Each entry holds one optional action per [`BindingLayer`]. The effective action is
//! picked with the priority user > default > terminal, so a terminal specific binding
//! never overrides a library default, and a user binding overrides both.

use super::{EditAction, KeySequence};
use std::ops::RangeInclusive;

/// Capacity is grown in steps of this many entries.
pub const KEY_TABLE_GROWTH_INCREMENT: usize = 100;

/// The source of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingLayer {
    /// Installed by the host application or by a configuration file.
    User,
    /// Installed for the current terminal type (arrow keys and friends).
    Terminal,
    /// The built-in emacs or vi binding set.
    Default,
}

/// One row of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindingEntry {
    pub sequence: KeySequence,
    pub user: Option<EditAction>,
    pub terminal: Option<EditAction>,
    pub default: Option<EditAction>,
}

impl KeyBindingEntry {
    fn new(sequence: KeySequence) -> Self {
        Self {
            sequence,
            user: None,
            terminal: None,
            default: None,
        }
    }

    /// Priority is user > default > terminal.
    #[must_use]
    pub fn effective_action(&self) -> Option<EditAction> {
        self.user.or(self.default).or(self.terminal)
    }

    #[must_use]
    pub fn layer_action(&self, layer: BindingLayer) -> Option<EditAction> {
        match layer {
            BindingLayer::User => self.user,
            BindingLayer::Terminal => self.terminal,
            BindingLayer::Default => self.default,
        }
    }

    fn layer_slot(&mut self, layer: BindingLayer) -> &mut Option<EditAction> {
        match layer {
            BindingLayer::User => &mut self.user,
            BindingLayer::Terminal => &mut self.terminal,
            BindingLayer::Default => &mut self.default,
        }
    }

    fn is_unbound(&self) -> bool {
        self.user.is_none() && self.terminal.is_none() && self.default.is_none()
    }
}

/// Result of [`KeyBindingTable::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyLookup {
    /// The sequence is bound. Holds the entry index.
    Exact(usize),
    /// The sequence is a strict prefix of the entries in this index range.
    Ambiguous(RangeInclusive<usize>),
    /// Nothing starts with the sequence. Holds the sorted insertion point.
    None(usize),
}

/// What [`KeyBindingTable::bind`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Inserted,
    /// The layer already had an action for this sequence and it was overwritten.
    Replaced,
    /// The layer slot was filled on an existing entry.
    Updated,
    /// The layer action was cleared and other layers still bind the sequence.
    Cleared,
    /// The last layer action was cleared and the entry was removed.
    Removed,
    /// Nothing to do (eg: deleting an unbound sequence).
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum KeyTableError {
    #[error("can't bind {sequence} because it is a prefix of {count} longer binding(s)")]
    #[diagnostic(
        code(r3bl_line_editor::key_table::would_shadow),
        help("Unbind the longer sequences first, or pick a sequence that is not a prefix")
    )]
    WouldShadow { sequence: String, count: usize },

    #[error("out of memory while growing the key binding table")]
    #[diagnostic(code(r3bl_line_editor::key_table::allocation_failure))]
    AllocationFailure,
}

/// See the module docs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyBindingTable {
    entries: Vec<KeyBindingEntry>,
}

impl KeyBindingTable {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Entries in sorted order.
    pub fn entries(&self) -> impl Iterator<Item = &KeyBindingEntry> { self.entries.iter() }

    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&KeyBindingEntry> { self.entries.get(index) }

    /// Binary search for `sequence`. See [`KeyLookup`].
    #[must_use]
    pub fn lookup(&self, sequence: &[u8]) -> KeyLookup {
        match self
            .entries
            .binary_search_by(|entry| entry.sequence.as_bytes().cmp(sequence))
        {
            Ok(index) => KeyLookup::Exact(index),
            Err(insertion_point) => {
                let run = self.entries[insertion_point..]
                    .iter()
                    .take_while(|entry| entry.sequence.starts_with(sequence))
                    .count();
                if run == 0 {
                    KeyLookup::None(insertion_point)
                } else {
                    KeyLookup::Ambiguous(insertion_point..=insertion_point + run - 1)
                }
            }
        }
    }

    /// The effective action bound to exactly `sequence`.
    #[must_use]
    pub fn action_for(&self, sequence: &[u8]) -> Option<EditAction> {
        match self.lookup(sequence) {
            KeyLookup::Exact(index) => self.entries[index].effective_action(),
            _ => None,
        }
    }

    /// Installs (`Some`) or removes (`None`) the `layer` action for `sequence`.
    ///
    /// A new binding is rejected when `sequence` is a strict prefix of existing longer
    /// bindings, since those would become unreachable. Removal through such a prefix
    /// is a no-op. On error the table is unchanged.
    ///
    /// # Errors
    ///
    /// [`KeyTableError::WouldShadow`] or [`KeyTableError::AllocationFailure`].
    pub fn bind(
        &mut self,
        layer: BindingLayer,
        sequence: &KeySequence,
        action: Option<EditAction>,
    ) -> Result<BindOutcome, KeyTableError> {
        match (self.lookup(sequence.as_bytes()), action) {
            (KeyLookup::Exact(index), Some(action)) => {
                let slot = self.entries[index].layer_slot(layer);
                let outcome = match slot {
                    Some(_) => BindOutcome::Replaced,
                    None => BindOutcome::Updated,
                };
                *slot = Some(action);
                Ok(outcome)
            }
            (KeyLookup::Exact(index), None) => {
                let entry = &mut self.entries[index];
                if entry.layer_slot(layer).take().is_none() {
                    return Ok(BindOutcome::Unchanged);
                }
                if entry.is_unbound() {
                    self.entries.remove(index);
                    Ok(BindOutcome::Removed)
                } else {
                    Ok(BindOutcome::Cleared)
                }
            }
            (KeyLookup::Ambiguous(range), Some(_)) => Err(KeyTableError::WouldShadow {
                sequence: sequence.describe(),
                count: range.count(),
            }),
            (KeyLookup::Ambiguous(_) | KeyLookup::None(_), None) => Ok(BindOutcome::Unchanged),
            (KeyLookup::None(insertion_point), Some(action)) => {
                self.reserve_for_insert()?;
                let mut entry = KeyBindingEntry::new(sequence.clone());
                *entry.layer_slot(layer) = Some(action);
                self.entries.insert(insertion_point, entry);
                Ok(BindOutcome::Inserted)
            }
        }
    }

    /// Removes every `layer` action and drops entries left with no action at all.
    /// Returns how many entries were dropped.
    pub fn clear_layer(&mut self, layer: BindingLayer) -> usize {
        let before = self.entries.len();
        self.entries.retain_mut(|entry| {
            *entry.layer_slot(layer) = None;
            !entry.is_unbound()
        });
        before - self.entries.len()
    }

    fn reserve_for_insert(&mut self) -> Result<(), KeyTableError> {
        if self.entries.len() < self.entries.capacity() {
            return Ok(());
        }
        self.entries
            .try_reserve_exact(KEY_TABLE_GROWTH_INCREMENT)
            .map_err(|_| KeyTableError::AllocationFailure)
    }
}
