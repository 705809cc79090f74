// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::LineEditorError;
use std::ops::Range;

/// Default capacity of the line being edited, in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// The bytes of the line being edited. The length never exceeds the capacity chosen
/// at construction, and bytes that don't fit are dropped by the insert methods (which
/// report how many made it in).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl EditBuffer {
    /// # Errors
    ///
    /// [`LineEditorError::AllocationFailure`] when the storage can't be reserved.
    pub fn try_new(capacity: usize) -> Result<Self, LineEditorError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| LineEditorError::AllocationFailure { what: "edit buffer" })?;
        Ok(Self { bytes, capacity })
    }

    #[must_use]
    pub fn len(&self) -> usize { self.bytes.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    #[must_use]
    pub fn capacity(&self) -> usize { self.capacity }

    #[must_use]
    pub fn is_full(&self) -> bool { self.bytes.len() >= self.capacity }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<u8> { self.bytes.get(index).copied() }

    /// Inserts at `at` (clamped to the length). Returns the number of bytes inserted.
    pub fn insert(&mut self, at: usize, bytes: &[u8]) -> usize {
        let at = at.min(self.bytes.len());
        let room = self.capacity - self.bytes.len();
        let fitting = &bytes[..bytes.len().min(room)];
        self.bytes.splice(at..at, fitting.iter().copied());
        fitting.len()
    }

    /// Writes over the bytes from `at`, growing the line when it runs past the end.
    /// Returns the number of bytes written.
    pub fn overwrite(&mut self, at: usize, bytes: &[u8]) -> usize {
        let at = at.min(self.bytes.len());
        let mut written = 0;
        for (offset, &byte) in bytes.iter().enumerate() {
            let index = at + offset;
            if index < self.bytes.len() {
                self.bytes[index] = byte;
            } else if self.bytes.len() < self.capacity {
                self.bytes.push(byte);
            } else {
                break;
            }
            written += 1;
        }
        written
    }

    /// Removes `range` (clamped to the length) and returns the removed bytes.
    pub fn remove(&mut self, range: Range<usize>) -> Vec<u8> {
        let end = range.end.min(self.bytes.len());
        let start = range.start.min(end);
        self.bytes.drain(start..end).collect()
    }

    /// Replaces the whole line, truncating what doesn't fit.
    pub fn set(&mut self, bytes: &[u8]) {
        self.bytes.clear();
        self.bytes
            .extend_from_slice(&bytes[..bytes.len().min(self.capacity)]);
    }

    pub fn clear(&mut self) { self.bytes.clear(); }

    /// Applies `f` to every byte in `range` (clamped to the length).
    pub fn transform(&mut self, range: Range<usize>, mut f: impl FnMut(usize, u8) -> u8) {
        let end = range.end.min(self.bytes.len());
        let start = range.start.min(end);
        for (index, byte) in self.bytes[start..end].iter_mut().enumerate() {
            *byte = f(start + index, *byte);
        }
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        if a < self.bytes.len() && b < self.bytes.len() {
            self.bytes.swap(a, b);
        }
    }

    /// The line as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn to_string_lossy(&self) -> String { String::from_utf8_lossy(&self.bytes).into_owned() }
}
