// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera profile: an ordered timeline of fixtures.
//!
//! Fixture start ticks are never stored. The offset of fixture `i` is the
//! sum of the durations before it, so inserting, removing, moving or
//! resizing a fixture shifts everything after it without any re-indexing.

use crate::error::ProfileError;
use crate::fixture::{Fixture, FixtureId};
use crate::modifier::{ModifierContext, ModifierStack, PoseModifier};
use crate::pose::Pose;
use crate::Tick;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where a profile is stored. Two profiles with the same destination
/// can't be loaded at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    /// Stored on the local client under a file name
    Client(String),
    /// Stored on the server under a file name
    Server(String),
}

impl Destination {
    /// File name part of the destination
    pub fn filename(&self) -> &str {
        match self {
            Self::Client(name) | Self::Server(name) => name,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(name) => write!(f, "client:{name}"),
            Self::Server(name) => write!(f, "server:{name}"),
        }
    }
}

/// Profile shared between a simulation thread (mutations) and a render
/// thread (evaluation)
pub type SharedProfile = Arc<RwLock<Profile>>;

/// Ordered sequence of fixtures plus identity and dirty state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    destination: Destination,
    fixtures: Vec<Fixture>,
    /// Modifiers applied after every fixture
    #[serde(default)]
    pub modifiers: ModifierStack,
    #[serde(skip)]
    dirty: bool,
    #[serde(skip)]
    revision: u64,
}

impl Profile {
    /// Create an empty profile
    pub fn new(destination: Destination) -> Self {
        Self {
            destination,
            fixtures: Vec::new(),
            modifiers: ModifierStack::new(),
            dirty: false,
            revision: 0,
        }
    }

    /// Wrap the profile for cross-thread use
    pub fn into_shared(self) -> SharedProfile {
        Arc::new(RwLock::new(self))
    }

    /// Storage identity
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Whether the profile changed since it was last saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag the profile as changed
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.revision = self.revision.wrapping_add(1);
    }

    /// Clear the dirty flag. Only persistence should call this.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Take the fixtures and modifiers of `other` as a single mutation.
    /// The destination and revision history stay with `self`.
    pub fn restore(&mut self, other: Profile) {
        self.fixtures = other.fixtures;
        self.modifiers = other.modifiers;
        self.mark_dirty();
    }

    /// Counter bumped on every mutation, used to invalidate cached poses
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// All fixtures in timeline order
    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    /// Number of fixtures
    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    /// Whether the profile has no fixtures
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    /// Whether `index` addresses a fixture
    pub fn has(&self, index: usize) -> bool {
        index < self.fixtures.len()
    }

    /// Fixture at `index`
    pub fn get(&self, index: usize) -> Option<&Fixture> {
        self.fixtures.get(index)
    }

    /// Position of the fixture with the given ID
    pub fn index_of(&self, id: FixtureId) -> Option<usize> {
        self.fixtures.iter().position(|f| f.id == id)
    }

    /// Edit a fixture in place. The profile is marked dirty only when the
    /// edit changed the fixture.
    pub fn edit<R>(&mut self, index: usize, edit: impl FnOnce(&mut Fixture) -> R) -> Option<R> {
        let fixture = self.fixtures.get_mut(index)?;
        let before = fixture.clone();
        let result = edit(fixture);

        if *fixture != before {
            self.mark_dirty();
        }
        Some(result)
    }

    /// Append a fixture
    pub fn add(&mut self, fixture: Fixture) {
        self.fixtures.push(fixture);
        self.mark_dirty();
    }

    /// Insert a fixture before `index`. Indices past the end append.
    pub fn insert(&mut self, index: usize, fixture: Fixture) {
        let index = index.min(self.fixtures.len());
        self.fixtures.insert(index, fixture);
        self.mark_dirty();
    }

    /// Remove the fixture at `index`; out-of-range indices do nothing
    pub fn remove(&mut self, index: usize) -> Option<Fixture> {
        if !self.has(index) {
            return None;
        }

        let fixture = self.fixtures.remove(index);
        self.mark_dirty();
        Some(fixture)
    }

    /// Like [`Self::remove`] but reports an invalid index
    pub fn try_remove(&mut self, index: usize) -> Result<Fixture, ProfileError> {
        let len = self.len();
        self.remove(index).ok_or(ProfileError::InvalidIndex { index, len })
    }

    /// Move a fixture to another position. Both indices are checked
    /// before anything changes; returns whether the move happened.
    pub fn move_fixture(&mut self, from: usize, to: usize) -> bool {
        if !self.has(from) || !self.has(to) {
            return false;
        }

        if from != to {
            let fixture = self.fixtures.remove(from);
            self.fixtures.insert(to, fixture);
            self.mark_dirty();
        }

        true
    }

    /// Like [`Self::move_fixture`] but reports which index was invalid
    pub fn try_move(&mut self, from: usize, to: usize) -> Result<(), ProfileError> {
        let len = self.len();
        for index in [from, to] {
            if index >= len {
                return Err(ProfileError::InvalidIndex { index, len });
            }
        }

        self.move_fixture(from, to);
        Ok(())
    }

    /// Change the duration of the fixture at `index`
    pub fn set_duration(&mut self, index: usize, duration: i64) -> Result<(), ProfileError> {
        let len = self.len();
        let fixture = self
            .fixtures
            .get_mut(index)
            .ok_or(ProfileError::InvalidIndex { index, len })?;

        fixture.set_duration(duration)?;
        self.mark_dirty();
        Ok(())
    }

    /// Sum of all fixture durations, saturating at `Tick::MAX`
    pub fn duration(&self) -> Tick {
        self.offset_of(self.fixtures.len())
    }

    /// Start tick of the fixture at `index`. Indices past the end give the
    /// total duration.
    pub fn offset_of(&self, index: usize) -> Tick {
        self.fixtures
            .iter()
            .take(index)
            .fold(0, |offset, fixture| offset.saturating_add(fixture.duration()))
    }

    /// Start tick of the fixture with the given ID
    pub fn offset_of_fixture(&self, id: FixtureId) -> Option<Tick> {
        self.index_of(id).map(|index| self.offset_of(index))
    }

    /// Find the fixture covering `tick` and the tick local to it.
    ///
    /// Intervals are half-open `[offset, offset + duration)`, except at the
    /// very end of the profile where `tick == duration()` resolves to the
    /// last fixture at its own duration. Ticks past the end are clamped.
    pub fn locate(&self, tick: Tick) -> Option<(usize, Tick)> {
        let last = self.fixtures.len().checked_sub(1)?;
        let tick = tick.min(self.duration());

        let mut offset: Tick = 0;
        for (index, fixture) in self.fixtures.iter().enumerate() {
            let end = offset.saturating_add(fixture.duration());
            if tick < end {
                return Some((index, tick - offset));
            }
            offset = end;
        }

        Some((last, self.fixtures[last].duration()))
    }

    /// Raw fixture contribution at `tick`, without modifiers. An empty
    /// profile returns `pose` unchanged.
    pub fn evaluate(&self, tick: Tick, fractional: f32, pose: Pose) -> Pose {
        match self.locate(tick) {
            Some((index, local)) => self.fixtures[index].evaluate(local, fractional, pose),
            None => pose,
        }
    }

    /// Modifier context for `tick`, or `None` for an empty profile
    pub fn context(&self, tick: Tick, fractional: f32) -> Option<ModifierContext> {
        let (index, local_tick) = self.locate(tick)?;

        Some(ModifierContext {
            tick: tick.min(self.duration()),
            local_tick,
            fractional,
            duration: self.fixtures[index].duration(),
        })
    }

    /// Fixture contribution followed by the fixture's modifiers and then
    /// the profile's modifiers
    pub fn apply(&self, tick: Tick, fractional: f32, pose: Pose) -> Pose {
        let Some((index, local_tick)) = self.locate(tick) else {
            return pose;
        };
        let Some(context) = self.context(tick, fractional) else {
            return pose;
        };

        let fixture = &self.fixtures[index];
        let pose = fixture.evaluate(local_tick, fractional, pose);
        fixture.modifiers.apply_with(pose, &context, &self.modifiers)
    }

    /// [`Self::apply`] followed by a host-supplied modifier. An empty
    /// profile returns `pose` unchanged.
    pub fn apply_with(&self, tick: Tick, fractional: f32, pose: Pose, host: &dyn PoseModifier) -> Pose {
        match self.context(tick, fractional) {
            Some(context) => host.transform(self.apply(tick, fractional, pose), &context),
            None => pose,
        }
    }

    /// Nearest fixture boundary.
    ///
    /// Forward gives the first fixture start strictly after `tick` (or the
    /// end of the profile). Backward gives the start of the fixture that
    /// covers `tick - 1`. The result is always within `[0, duration()]`.
    pub fn boundary_near(&self, tick: Tick, forward: bool) -> Tick {
        let duration = self.duration();

        if forward {
            let mut offset: Tick = 0;
            for fixture in &self.fixtures {
                if offset > tick {
                    return offset.min(duration);
                }
                offset = offset.saturating_add(fixture.duration());
            }
            return duration;
        }

        match self.locate(tick.saturating_sub(1)) {
            Some((index, _)) => self.offset_of(index),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::MAX_DURATION;
    use crate::pose::{Angle, Point};

    fn profile(durations: &[Tick]) -> Profile {
        let mut profile = Profile::new(Destination::Client("test".into()));
        for (i, duration) in durations.iter().enumerate() {
            let pose = Pose::new(Point::new(i as f64, 0.0, 0.0), Angle::default());
            profile.add(Fixture::idle(*duration, pose));
        }
        profile.mark_saved();
        profile
    }

    fn durations(profile: &Profile) -> Vec<Tick> {
        profile.fixtures().iter().map(Fixture::duration).collect()
    }

    #[test]
    fn test_restore_keeps_revision_moving() {
        let mut current = profile(&[10, 20]);
        let revision = current.revision();

        let mut other = Profile::new(Destination::Server("elsewhere".into()));
        other.add(Fixture::idle(5, Pose::default()));
        current.restore(other);

        assert_eq!(durations(&current), vec![5]);
        assert_eq!(current.destination(), &Destination::Client("test".into()));
        assert!(current.revision() > revision);
        assert!(current.is_dirty());
    }

    #[test]
    fn test_offsets() {
        let profile = profile(&[10, 20, 15]);

        assert_eq!(profile.duration(), 45);
        assert_eq!(profile.offset_of(0), 0);
        assert_eq!(profile.offset_of(1), 10);
        assert_eq!(profile.offset_of(2), 30);
        assert_eq!(profile.offset_of(3), 45);
    }

    #[test]
    fn test_locate() {
        let profile = profile(&[10, 20, 15]);

        assert_eq!(profile.locate(0), Some((0, 0)));
        assert_eq!(profile.locate(9), Some((0, 9)));
        assert_eq!(profile.locate(10), Some((1, 0)));
        assert_eq!(profile.locate(25), Some((1, 15)));
        assert_eq!(profile.locate(45), Some((2, 15)));
        assert_eq!(profile.locate(1000), Some((2, 15)));
    }

    #[test]
    fn test_locate_empty() {
        let profile = profile(&[]);

        assert_eq!(profile.duration(), 0);
        assert_eq!(profile.locate(0), None);
        assert_eq!(profile.locate(5), None);
    }

    #[test]
    fn test_zero_duration_fixture_only_at_end() {
        let profile = profile(&[10, 0, 5, 0]);

        assert_eq!(profile.locate(10), Some((2, 0)));
        assert_eq!(profile.locate(15), Some((3, 0)));
    }

    #[test]
    fn test_evaluate_empty_is_identity() {
        let profile = profile(&[]);
        let pose = Pose::new(Point::new(1.0, 2.0, 3.0), Angle::default());

        assert_eq!(profile.evaluate(12, 0.5, pose), pose);
        assert_eq!(profile.apply(12, 0.5, pose), pose);
    }

    #[test]
    fn test_insert_shifts_later_offsets() {
        let mut profile = profile(&[10, 20, 15]);
        profile.insert(1, Fixture::idle(7, Pose::default()));

        assert_eq!(durations(&profile), vec![10, 7, 20, 15]);
        assert_eq!(profile.offset_of(2), 17);
        assert_eq!(profile.offset_of(3), 37);
        assert!(profile.is_dirty());
    }

    #[test]
    fn test_remove_shifts_back() {
        let mut profile = profile(&[10, 20, 15]);
        let removed = profile.remove(1).unwrap();

        assert_eq!(removed.duration(), 20);
        assert_eq!(profile.offset_of(1), 10);
        assert_eq!(profile.duration(), 25);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut profile = profile(&[10]);
        assert!(profile.remove(0).is_some());
        assert!(profile.remove(0).is_none());
        assert!(matches!(
            profile.try_remove(3),
            Err(ProfileError::InvalidIndex { index: 3, len: 0 })
        ));
    }

    #[test]
    fn test_move() {
        let mut profile = profile(&[10, 20, 15]);

        assert!(profile.move_fixture(0, 2));
        assert_eq!(durations(&profile), vec![20, 15, 10]);
        assert_eq!(profile.duration(), 45);
        assert_eq!(
            (0..3).map(|i| profile.offset_of(i)).collect::<Vec<_>>(),
            vec![0, 20, 35]
        );
    }

    #[test]
    fn test_move_out_of_range_rejected() {
        let mut profile = profile(&[10, 20, 15]);

        assert!(!profile.move_fixture(0, 3));
        assert_eq!(durations(&profile), vec![10, 20, 15]);
        assert!(!profile.is_dirty());
        assert_eq!(
            profile.try_move(5, 0),
            Err(ProfileError::InvalidIndex { index: 5, len: 3 })
        );
    }

    #[test]
    fn test_boundary_near() {
        let profile = profile(&[10, 20, 15]);

        assert_eq!(profile.boundary_near(25, true), 30);
        assert_eq!(profile.boundary_near(25, false), 10);
        assert_eq!(profile.boundary_near(10, false), 0);
        assert_eq!(profile.boundary_near(0, true), 10);
        assert_eq!(profile.boundary_near(0, false), 0);
        assert_eq!(profile.boundary_near(40, true), 45);
        assert_eq!(profile.boundary_near(45, true), 45);
        assert_eq!(profile.boundary_near(45, false), 30);
    }

    #[test]
    fn test_set_duration() {
        let mut profile = profile(&[10, 20]);

        assert_eq!(profile.set_duration(0, -5), Err(ProfileError::NegativeDuration(-5)));
        assert!(!profile.is_dirty());

        profile.set_duration(0, 4).unwrap();
        assert_eq!(profile.offset_of(1), 4);
        assert!(profile.is_dirty());
    }

    #[test]
    fn test_evaluate_picks_owning_fixture() {
        let profile = profile(&[10, 20, 15]);

        assert_eq!(profile.evaluate(5, 0.0, Pose::default()).point.x, 0.0);
        assert_eq!(profile.evaluate(25, 0.3, Pose::default()).point.x, 1.0);
        assert_eq!(profile.evaluate(45, 0.0, Pose::default()).point.x, 2.0);
    }

    #[test]
    fn test_revision_changes_on_mutation() {
        let mut profile = profile(&[10]);
        let before = profile.revision();

        profile.edit(0, |f| f.name = "intro".into());
        assert_ne!(profile.revision(), before);
        assert!(profile.edit(7, |f| f.name.clear()).is_none());
    }

    #[test]
    fn test_unchanged_edit_keeps_revision() {
        let mut profile = profile(&[10]);
        let before = profile.revision();

        let name = profile.edit(0, |f| f.name.clone());
        assert_eq!(name, Some(String::new()));
        profile.edit(0, |f| f.set_duration(10)).unwrap().unwrap();

        assert_eq!(profile.revision(), before);
        assert!(!profile.is_dirty());

        profile.edit(0, |f| f.name = "intro".into());
        assert_eq!(profile.revision(), before + 1);
        assert!(profile.is_dirty());
    }

    #[test]
    fn test_huge_durations_do_not_overflow() {
        let mut profile = profile(&[10, 10, 10]);

        for i in 0..3 {
            assert_eq!(
                profile.set_duration(i, i64::MAX),
                Err(ProfileError::DurationTooLong(i64::MAX))
            );
        }
        assert_eq!(profile.duration(), 30);

        for i in 0..3 {
            profile.set_duration(i, MAX_DURATION as i64).unwrap();
        }
        let total = profile.duration();

        assert_eq!(total, 3 * MAX_DURATION);
        assert_eq!(profile.offset_of(2), 2 * MAX_DURATION);
        assert_eq!(profile.locate(total), Some((2, MAX_DURATION)));
        assert_eq!(profile.locate(Tick::MAX), Some((2, MAX_DURATION)));
        assert_eq!(profile.boundary_near(0, true), MAX_DURATION);
    }
}
