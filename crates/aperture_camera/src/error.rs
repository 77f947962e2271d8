// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for profile editing and storage.

use crate::profile::Destination;

/// Errors raised when mutating a profile
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    /// Index does not address a fixture
    #[error("Fixture index {index} out of range (profile has {len} fixtures)")]
    InvalidIndex {
        /// Requested index
        index: usize,
        /// Number of fixtures in the profile
        len: usize,
    },

    /// Durations can't go below zero
    #[error("Negative fixture duration: {0}")]
    NegativeDuration(i64),

    /// Duration is longer than a fixture may be
    #[error("Fixture duration {0} exceeds the maximum")]
    DurationTooLong(i64),

    /// Operation needs an active profile
    #[error("No camera profile selected")]
    NoProfile,
}

/// Errors raised by a profile store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing stored under this destination
    #[error("Camera profile not found: {0}")]
    NotFound(Destination),

    /// Backend failed to encode or decode the profile
    #[error("Serialization error: {0}")]
    Serialization(String),
}
