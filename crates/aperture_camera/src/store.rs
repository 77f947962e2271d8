// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persistence collaborator.
//!
//! The camera core never picks a storage format. It tracks the dirty flag
//! and hands profiles to a [`ProfileStore`] when they need flushing.

use crate::error::StoreError;
use crate::profile::{Destination, Profile};
use indexmap::IndexMap;

/// Saves and loads camera profiles
pub trait ProfileStore {
    /// Persist a profile under its destination
    fn save(&mut self, profile: &Profile) -> Result<(), StoreError>;

    /// Load the profile stored under `destination`
    fn load(&self, destination: &Destination) -> Result<Profile, StoreError>;
}

/// Store that keeps profiles in memory, in save order
#[derive(Debug, Default)]
pub struct MemoryStore {
    profiles: IndexMap<Destination, Profile>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Destinations currently stored
    pub fn destinations(&self) -> impl Iterator<Item = &Destination> {
        self.profiles.keys()
    }

    /// Number of stored profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether nothing was stored yet
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl ProfileStore for MemoryStore {
    fn save(&mut self, profile: &Profile) -> Result<(), StoreError> {
        let mut stored = profile.clone();
        stored.mark_saved();
        self.profiles.insert(profile.destination().clone(), stored);
        Ok(())
    }

    fn load(&self, destination: &Destination) -> Result<Profile, StoreError> {
        self.profiles
            .get(destination)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(destination.clone()))
    }
}
