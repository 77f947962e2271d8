// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history for camera profile edits.
//!
//! Every edit stores a before and after snapshot of the whole profile,
//! encoded with bincode.

use aperture_camera::Profile;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Maximum undo history depth
const MAX_HISTORY: usize = 100;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Encoded profile state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    data: Vec<u8>,
}

impl StateSnapshot {
    /// Encode a profile
    pub fn from_profile(profile: &Profile) -> Result<Self> {
        Ok(Self {
            data: bincode::serialize(profile)?,
        })
    }

    /// Decode back into a profile
    pub fn to_profile(&self) -> Result<Profile> {
        Ok(bincode::deserialize(&self.data)?)
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A single undoable edit
#[derive(Debug, Clone)]
pub struct Edit {
    /// Human-readable description
    pub description: String,
    before: StateSnapshot,
    after: StateSnapshot,
}

impl Edit {
    fn memory_size(&self) -> usize {
        self.before.size() + self.after.size()
    }
}

/// Undo/redo history manager
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<Edit>,
    redo_stack: VecDeque<Edit>,
    max_depth: usize,
    memory_used: usize,
}

impl History {
    /// Create a new history manager
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth,
            memory_used: 0,
        }
    }

    /// Snapshot a profile before editing it
    pub fn snapshot(profile: &Profile) -> Result<StateSnapshot> {
        StateSnapshot::from_profile(profile)
    }

    /// Record an edit given the state before it and the profile after it
    pub fn record(&mut self, description: impl Into<String>, before: StateSnapshot, after: &Profile) -> Result<()> {
        let edit = Edit {
            description: description.into(),
            before,
            after: StateSnapshot::from_profile(after)?,
        };

        // Clear redo stack
        self.redo_stack.clear();

        self.memory_used += edit.memory_size();
        self.undo_stack.push_back(edit);

        // Enforce history limit
        while self.undo_stack.len() > self.max_depth {
            if let Some(old) = self.undo_stack.pop_front() {
                self.memory_used = self.memory_used.saturating_sub(old.memory_size());
            }
        }

        Ok(())
    }

    /// Undo the last edit, returning the profile as it was before it
    pub fn undo(&mut self) -> Result<Profile> {
        let edit = self.undo_stack.pop_back().ok_or(HistoryError::NothingToUndo)?;
        let profile = edit.before.to_profile()?;

        self.memory_used = self.memory_used.saturating_sub(edit.memory_size());
        self.redo_stack.push_back(edit);
        Ok(profile)
    }

    /// Redo the last undone edit, returning the profile as it was after it
    pub fn redo(&mut self) -> Result<Profile> {
        let edit = self.redo_stack.pop_back().ok_or(HistoryError::NothingToRedo)?;
        let profile = edit.after.to_profile()?;

        self.memory_used += edit.memory_size();
        self.undo_stack.push_back(edit);
        Ok(profile)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Bytes held by snapshots
    pub fn memory_used(&self) -> usize {
        self.memory_used
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.memory_used = 0;
    }

    /// Get description of next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|e| e.description.as_str())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
