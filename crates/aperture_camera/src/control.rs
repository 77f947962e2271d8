// SPDX-License-Identifier: MIT OR Apache-2.0
//! Set of loaded camera profiles plus camera roll and field of view.

use crate::error::StoreError;
use crate::pose::DEFAULT_FOV;
use crate::profile::{Destination, Profile};
use crate::store::ProfileStore;
use indexmap::IndexMap;

/// Loaded profiles, keyed by destination, in load order
#[derive(Debug)]
pub struct CameraControl {
    profiles: IndexMap<Destination, Profile>,
    current: Option<Destination>,
    roll: f32,
    fov: f32,
}

impl CameraControl {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            profiles: IndexMap::new(),
            current: None,
            roll: 0.0,
            fov: DEFAULT_FOV,
        }
    }

    /// Add a profile, replacing any loaded profile with the same
    /// destination. The new profile goes to the end of the list.
    pub fn insert_or_replace(&mut self, profile: Profile) -> Option<Profile> {
        let destination = profile.destination().clone();
        let replaced = self.profiles.shift_remove(&destination);

        if replaced.is_some() {
            tracing::debug!(profile = %destination, "Replaced camera profile");
        }

        self.profiles.insert(destination, profile);
        replaced
    }

    /// Insert a profile and make it current
    pub fn add_profile(&mut self, profile: Profile) {
        let destination = profile.destination().clone();
        self.insert_or_replace(profile);

        tracing::info!(profile = %destination, "Camera profile added");
        self.current = Some(destination);
    }

    /// Unload a profile. Clears the current profile if it was this one.
    pub fn remove_profile(&mut self, destination: &Destination) -> Option<Profile> {
        let removed = self.profiles.shift_remove(destination)?;

        if self.current.as_ref() == Some(destination) {
            self.current = None;
        }

        tracing::info!(profile = %destination, "Camera profile removed");
        Some(removed)
    }

    /// Whether a profile with this destination is loaded
    pub fn has_similar(&self, destination: &Destination) -> bool {
        self.profiles.contains_key(destination)
    }

    /// Loaded profile by destination
    pub fn profile(&self, destination: &Destination) -> Option<&Profile> {
        self.profiles.get(destination)
    }

    /// Mutable loaded profile by destination
    pub fn profile_mut(&mut self, destination: &Destination) -> Option<&mut Profile> {
        self.profiles.get_mut(destination)
    }

    /// All loaded profiles in load order
    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }

    /// Number of loaded profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no profile is loaded
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Destination of the current profile
    pub fn current_destination(&self) -> Option<&Destination> {
        self.current.as_ref()
    }

    /// The profile being edited or played
    pub fn current(&self) -> Option<&Profile> {
        self.current.as_ref().and_then(|d| self.profiles.get(d))
    }

    /// Mutable current profile
    pub fn current_mut(&mut self) -> Option<&mut Profile> {
        let destination = self.current.as_ref()?;
        self.profiles.get_mut(destination)
    }

    /// Select the current profile. Unknown destinations select nothing.
    pub fn select(&mut self, destination: Option<&Destination>) {
        self.current = destination.filter(|d| self.profiles.contains_key(*d)).cloned();
    }

    /// Load a profile from `store` and make it current
    pub fn load(&mut self, store: &dyn ProfileStore, destination: &Destination) -> Result<(), StoreError> {
        let profile = store.load(destination)?;
        self.add_profile(profile);
        Ok(())
    }

    /// Save the profile with this destination and clear its dirty flag
    pub fn save(&mut self, store: &mut dyn ProfileStore, destination: &Destination) -> Result<(), StoreError> {
        let profile = self
            .profiles
            .get_mut(destination)
            .ok_or_else(|| StoreError::NotFound(destination.clone()))?;

        store.save(profile)?;
        profile.mark_saved();
        tracing::info!(profile = %destination, "Camera profile saved");
        Ok(())
    }

    /// Flush every dirty profile to `store` and unload everything.
    ///
    /// On a save failure nothing is unloaded, so unsaved edits survive.
    /// Returns the number of profiles that were written.
    pub fn reset(&mut self, store: &mut dyn ProfileStore) -> Result<usize, StoreError> {
        let mut saved = 0;

        for profile in self.profiles.values_mut().filter(|p| p.is_dirty()) {
            store.save(profile)?;
            profile.mark_saved();
            saved += 1;
        }

        tracing::info!(saved, unloaded = self.profiles.len(), "Camera profiles reset");
        self.profiles.clear();
        self.current = None;
        Ok(saved)
    }

    /// Camera roll in degrees
    pub fn roll(&self) -> f32 {
        self.roll
    }

    /// Set the camera roll
    pub fn set_roll(&mut self, roll: f32) {
        self.roll = roll;
    }

    /// Set the roll back to 0
    pub fn reset_roll(&mut self) {
        self.set_roll(0.0);
    }

    /// Camera field of view in degrees
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Set the field of view
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
    }

    /// Set the field of view back to the default
    pub fn reset_fov(&mut self) {
        self.set_fov(DEFAULT_FOV);
    }

    /// Set roll and field of view together
    pub fn set_roll_and_fov(&mut self, roll: f32, fov: f32) {
        self.set_roll(roll);
        self.set_fov(fov);
    }
}

impl Default for CameraControl {
    fn default() -> Self {
        Self::new()
    }
}
