// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless camera editor.
//!
//! This module handles:
//! - Fixture selection and the scrub position
//! - Fixture editing commands with undo/redo
//! - Syncing the camera to the scrubbed tick
//! - Opening and closing the editor around a host camera

use crate::config::{parse_aspect_ratio, EditorConfig};
use crate::history::{History, HistoryError};
use aperture_camera::{
    CameraSession, CameraSubject, Destination, Fixture, FlightInput, Pose, Profile, ProfileError, RunState,
    SessionMode, StandIn, Tick,
};
use thiserror::Error;

/// Editor command errors
#[derive(Debug, Error)]
pub enum EditorError {
    /// The command needs a profile or fixture that is not there
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Snapshotting or restoring the profile failed
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Result type for editor commands
pub type Result<T> = std::result::Result<T, EditorError>;

/// Editing surface state over a [`CameraSession`]
#[derive(Debug)]
pub struct CameraEditor {
    /// Loaded profiles, runner and flight
    pub session: CameraSession,
    config: EditorConfig,
    history: History,
    selection: Option<usize>,
    scrub: Tick,
    /// Scrub range used when the profile is shorter
    pub max_scrub: Tick,
    syncing: bool,
    have_scrubbed: bool,
    aspect_ratio: f32,
    last_fov: f32,
    last_roll: f32,
}

impl CameraEditor {
    /// Create an editor with an empty session
    pub fn new(config: EditorConfig) -> Self {
        let aspect_ratio = parse_aspect_ratio(&config.aspect_ratio).unwrap_or(16.0 / 9.0);

        Self {
            session: CameraSession::new(),
            syncing: config.sync,
            last_fov: config.default_fov,
            config,
            history: History::new(),
            selection: None,
            scrub: 0,
            max_scrub: 0,
            have_scrubbed: false,
            aspect_ratio,
            last_roll: 0.0,
        }
    }

    /// Editor settings
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Selected fixture index
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Scrub position
    pub fn scrub(&self) -> Tick {
        self.scrub
    }

    /// Whether the camera follows the scrub position
    pub fn is_syncing(&self) -> bool {
        self.syncing
    }

    /// Turn syncing on or off
    pub fn set_syncing(&mut self, syncing: bool) {
        self.syncing = syncing;
    }

    /// Whether the user moved the scrub since the editor opened
    pub fn have_scrubbed(&self) -> bool {
        self.have_scrubbed
    }

    /// Undo history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Letterbox aspect ratio
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Set the aspect ratio from `"1.85"` or `"16:9"`. Unparseable text
    /// keeps the previous ratio.
    pub fn set_aspect_ratio(&mut self, text: &str) -> f32 {
        match parse_aspect_ratio(text) {
            Some(ratio) => self.aspect_ratio = ratio,
            None => tracing::warn!(text, "Ignoring invalid aspect ratio"),
        }
        self.aspect_ratio
    }

    /// Upper end of the scrub range
    pub fn scrub_max(&self) -> Tick {
        match self.session.control.current() {
            Some(profile) => profile.duration().max(self.max_scrub),
            None => self.max_scrub,
        }
    }

    /// Prepare the editor for a host camera
    pub fn open(&mut self, subject: &dyn CameraSubject) {
        self.max_scrub = 0;
        self.have_scrubbed = false;
        self.session.set_flight(false);
        self.last_fov = self.session.control.fov();
        self.last_roll = self.session.control.roll();

        let aspect_ratio = self.config.aspect_ratio.clone();
        self.set_aspect_ratio(&aspect_ratio);

        if self.config.outside_on_open {
            self.session.attach_outside(subject);
        }

        self.pick_fixture(self.selection);
        self.scrub = self.scrub.min(self.scrub_max());
        tracing::info!(profile = ?self.session.control.current_destination(), "Camera editor opened");
    }

    /// Restore the host camera state captured by [`Self::open`]
    pub fn close(&mut self) {
        self.session.control.set_roll_and_fov(self.last_roll, self.last_fov);

        if !self.session.runner().is_running() {
            self.session.detach_outside();
        }
        tracing::info!("Camera editor closed");
    }

    /// Switch to another loaded profile. Switching clears the selection
    /// and the undo history.
    pub fn select_profile(&mut self, destination: Option<&Destination>) {
        let same = self.session.control.current_destination() == destination;
        self.session.control.select(destination);

        if !same {
            self.pick_fixture(None);
            self.history.clear();
        }
    }

    /// Select a fixture. Unknown indices clear the selection. While
    /// syncing the scrub moves to the fixture's start.
    pub fn pick_fixture(&mut self, index: Option<usize>) {
        let Some(profile) = self.session.control.current() else {
            self.selection = None;
            return;
        };

        self.selection = index.filter(|i| profile.has(*i));

        if let (Some(index), true) = (self.selection, self.syncing) {
            self.scrub = profile.offset_of(index).min(self.scrub_max());
        }
    }

    /// Insert a fixture before the selection, or append it when nothing
    /// is selected. The new fixture becomes the selection.
    pub fn create_fixture(&mut self, fixture: Fixture) -> Result<usize> {
        let len = self.current()?.len();
        let index = self.selection.map_or(len, |selected| selected.min(len));

        self.mutate("Create fixture", |profile| {
            profile.insert(index, fixture);
            true
        })?;

        self.pick_fixture(Some(index));
        Ok(index)
    }

    /// Append a copy of the selected fixture and select it
    pub fn dupe_fixture(&mut self) -> Result<Option<usize>> {
        let Some(fixture) = self.selected().map(Fixture::duplicate) else {
            return Ok(None);
        };

        let mut index = 0;
        self.mutate("Duplicate fixture", |profile| {
            profile.add(fixture);
            index = profile.len() - 1;
            true
        })?;

        self.pick_fixture(Some(index));
        Ok(Some(index))
    }

    /// Remove the selected fixture and select the one before it
    pub fn remove_fixture(&mut self) -> Result<bool> {
        let Some(index) = self.selection else {
            return Ok(false);
        };

        let removed = self.mutate("Remove fixture", |profile| profile.remove(index).is_some())?;
        if removed {
            self.pick_fixture(index.checked_sub(1));
        }
        Ok(removed)
    }

    /// Move the selected fixture by `direction` places
    pub fn move_selected(&mut self, direction: isize) -> Result<bool> {
        let Some(index) = self.selection else {
            return Ok(false);
        };
        let Some(to) = index.checked_add_signed(direction) else {
            return Ok(false);
        };

        let moved = self.mutate("Move fixture", |profile| profile.move_fixture(index, to))?;
        if moved {
            self.selection = Some(to);
        }
        Ok(moved)
    }

    /// Stretch or shrink the selected fixture so it ends at the scrub
    /// position. Does nothing when the scrub is not past its start.
    pub fn shift_duration_to_cursor(&mut self) -> Result<bool> {
        let Some(index) = self.selection else {
            return Ok(false);
        };

        let scrub = self.scrub;
        self.mutate("Shift duration", |profile| {
            if !profile.has(index) {
                return false;
            }

            let offset = profile.offset_of(index);
            if scrub <= offset {
                return false;
            }

            let duration = i64::try_from(scrub - offset).unwrap_or(i64::MAX);
            matches!(profile.set_duration(index, duration), Ok(()))
        })
    }

    /// Copy the camera's pose into the selected fixture
    pub fn edit_fixture(&mut self, subject: &dyn CameraSubject) -> Result<bool> {
        let Some(index) = self.selection else {
            return Ok(false);
        };

        let camera = StandIn::new(self.session.camera_pose(subject));
        self.mutate("Edit fixture", |profile| {
            profile.edit(index, |fixture| fixture.capture_from(&camera)).is_some()
        })
    }

    /// Move the scrub on behalf of the user, clamped to the scrub range
    pub fn scrub_to(&mut self, tick: Tick) {
        let tick = tick.min(self.scrub_max());

        self.scrub = tick;
        self.have_scrubbed = true;
        self.session.seek(tick);
    }

    /// Scrub one tick forward
    pub fn jump_next_frame(&mut self) {
        self.scrub_to(self.scrub.saturating_add(1));
    }

    /// Scrub one tick back
    pub fn jump_prev_frame(&mut self) {
        self.scrub_to(self.scrub.saturating_sub(1));
    }

    /// Scrub to the start of the next fixture
    pub fn jump_next_fixture(&mut self) {
        if let Some(profile) = self.session.control.current() {
            let tick = profile.boundary_near(self.scrub, true);
            self.scrub_to(tick);
        }
    }

    /// Scrub to the start of the previous fixture
    pub fn jump_prev_fixture(&mut self) {
        if let Some(profile) = self.session.control.current() {
            let tick = profile.boundary_near(self.scrub, false);
            self.scrub_to(tick);
        }
    }

    /// Start playback from the scrub position, or stop it. Stopping puts
    /// the camera back on the stand-in at the scrub position.
    pub fn toggle_playback(&mut self, subject: &mut dyn CameraSubject) -> Result<RunState> {
        let state = self.session.toggle_playback(self.scrub)?;

        if state == RunState::Stopped {
            self.session.attach_outside(subject);
            self.sync_camera(0.0, subject);
        }
        Ok(state)
    }

    /// Flip flight on or off
    pub fn toggle_flight(&mut self) {
        self.session.toggle_flight();
    }

    /// Change flight speed by one step per scroll notch, only while flying
    pub fn adjust_flight_speed(&mut self, scroll: f32) {
        if !self.session.is_flying() || scroll == 0.0 || scroll.is_nan() {
            return;
        }

        let flight = self.session.flight_mut();
        let speed = flight.speed() + self.config.flight_speed_step.copysign(scroll);
        flight.set_speed(speed);
    }

    /// Undo the last profile edit
    pub fn undo(&mut self) -> Result<()> {
        let restored = self.history.undo()?;
        self.restore(restored)
    }

    /// Redo the last undone profile edit
    pub fn redo(&mut self) -> Result<()> {
        let restored = self.history.redo()?;
        self.restore(restored)
    }

    /// Per-frame update.
    ///
    /// `steps` simulation ticks are run first, then the camera is driven by
    /// whichever of flight, playback or scrub syncing is active.
    pub fn update(
        &mut self,
        steps: u32,
        fractional: f32,
        subject: &mut dyn CameraSubject,
        input: &FlightInput,
    ) -> Option<Pose> {
        let was_running = self.session.runner().is_running();
        for _ in 0..steps {
            self.session.step();
        }

        if was_running {
            self.scrub = self.session.runner().ticks().min(self.scrub_max());
        }

        match self.session.mode() {
            SessionMode::Flying => {
                let pose = self.session.frame(fractional, subject, input);

                if self.syncing && self.have_scrubbed {
                    let camera = StandIn::new(self.session.camera_pose(subject));
                    let changed = match (self.selection, self.session.control.current_mut()) {
                        (Some(index), Some(profile)) => {
                            let revision = profile.revision();
                            profile.edit(index, |fixture| fixture.capture_from(&camera));
                            profile.revision() != revision
                        }
                        _ => false,
                    };

                    if changed {
                        self.session.notify_mutated();
                    }
                }
                pose
            }
            SessionMode::Playing => self.session.frame(fractional, subject, input),
            SessionMode::Idle => {
                if self.syncing || self.session.runner().outside().is_some() {
                    self.sync_camera(fractional, subject)
                } else {
                    None
                }
            }
        }
    }

    fn sync_camera(&mut self, fractional: f32, subject: &mut dyn CameraSubject) -> Option<Pose> {
        self.session.apply_at(self.scrub, fractional, subject)
    }

    fn current(&self) -> Result<&Profile> {
        Ok(self.session.control.current().ok_or(ProfileError::NoProfile)?)
    }

    fn selected(&self) -> Option<&Fixture> {
        let index = self.selection?;
        self.session.control.current()?.get(index)
    }

    fn mutate(&mut self, description: &str, edit: impl FnOnce(&mut Profile) -> bool) -> Result<bool> {
        let profile = self.session.control.current_mut().ok_or(ProfileError::NoProfile)?;
        let before = History::snapshot(profile)?;

        if !edit(profile) {
            tracing::debug!(description, "Edit had no effect");
            return Ok(false);
        }

        self.history.record(description, before, profile)?;
        self.session.notify_mutated();
        self.scrub = self.scrub.min(self.scrub_max());
        Ok(true)
    }

    fn restore(&mut self, restored: Profile) -> Result<()> {
        let profile = self.session.control.current_mut().ok_or(ProfileError::NoProfile)?;
        profile.restore(restored);

        self.session.notify_mutated();
        self.pick_fixture(self.selection);
        self.scrub = self.scrub.min(self.scrub_max());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aperture_camera::{Angle, CameraEvent, Point};

    fn editor(durations: &[Tick]) -> CameraEditor {
        let mut profile = Profile::new(Destination::Client("editor".into()));
        for (i, duration) in durations.iter().enumerate() {
            let pose = Pose::new(Point::new(i as f64, 0.0, 0.0), Angle::default());
            profile.add(Fixture::idle(*duration, pose).with_name(format!("f{i}")));
        }

        let mut editor = CameraEditor::new(EditorConfig::default());
        editor.session.control.add_profile(profile);
        editor
    }

    fn names(editor: &CameraEditor) -> Vec<String> {
        editor
            .session
            .control
            .current()
            .map(|p| p.fixtures().iter().map(|f| f.name.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_create_inserts_before_selection() {
        let mut editor = editor(&[10, 10]);

        assert_eq!(editor.create_fixture(Fixture::idle(5, Pose::default()).with_name("end")).unwrap(), 2);
        editor.pick_fixture(Some(1));
        assert_eq!(editor.create_fixture(Fixture::idle(5, Pose::default()).with_name("mid")).unwrap(), 1);

        assert_eq!(names(&editor), vec!["f0", "mid", "f1", "end"]);
        assert_eq!(editor.selection(), Some(1));
    }

    #[test]
    fn test_create_without_profile() {
        let mut editor = CameraEditor::new(EditorConfig::default());
        let result = editor.create_fixture(Fixture::idle(5, Pose::default()));

        assert!(matches!(result, Err(EditorError::Profile(ProfileError::NoProfile))));
    }

    #[test]
    fn test_remove_selects_previous() {
        let mut editor = editor(&[10, 10, 10]);

        editor.pick_fixture(Some(1));
        assert!(editor.remove_fixture().unwrap());
        assert_eq!(editor.selection(), Some(0));
        assert_eq!(names(&editor), vec!["f0", "f2"]);

        assert!(editor.remove_fixture().unwrap());
        assert_eq!(editor.selection(), None);
        assert!(!editor.remove_fixture().unwrap());
    }

    #[test]
    fn test_dupe_appends_fresh_copy() {
        let mut editor = editor(&[10, 20]);

        editor.pick_fixture(Some(0));
        assert_eq!(editor.dupe_fixture().unwrap(), Some(2));

        let profile = editor.session.control.current().unwrap();
        assert_eq!(profile.fixtures()[2].name, "f0");
        assert_ne!(profile.fixtures()[2].id, profile.fixtures()[0].id);
        assert_eq!(profile.duration(), 40);
    }

    #[test]
    fn test_move_selected_follows_fixture() {
        let mut editor = editor(&[10, 20, 30]);

        editor.pick_fixture(Some(0));
        assert!(editor.move_selected(1).unwrap());
        assert_eq!(names(&editor), vec!["f1", "f0", "f2"]);
        assert_eq!(editor.selection(), Some(1));

        assert!(!editor.move_selected(-2).unwrap());
        assert!(!editor.move_selected(5).unwrap());
        assert_eq!(editor.selection(), Some(1));
        assert_eq!(editor.history().undo_description(), Some("Move fixture"));
    }

    #[test]
    fn test_shift_duration_to_cursor() {
        let mut editor = editor(&[10, 10]);
        editor.max_scrub = 40;

        editor.pick_fixture(Some(1));
        editor.scrub_to(25);
        assert!(editor.shift_duration_to_cursor().unwrap());
        assert_eq!(editor.session.control.current().map(Profile::duration), Some(25));

        editor.scrub_to(5);
        assert!(!editor.shift_duration_to_cursor().unwrap());
    }

    #[test]
    fn test_scrub_is_clamped() {
        let mut editor = editor(&[10, 10]);

        editor.scrub_to(100);
        assert_eq!(editor.scrub(), 20);
        assert!(editor.have_scrubbed());

        editor.scrub_to(0);
        editor.jump_prev_frame();
        assert_eq!(editor.scrub(), 0);

        editor.max_scrub = 50;
        editor.scrub_to(100);
        assert_eq!(editor.scrub(), 50);
    }

    #[test]
    fn test_fixture_jumps() {
        let mut editor = editor(&[10, 20, 15]);

        let mut forward = Vec::new();
        for _ in 0..4 {
            editor.jump_next_fixture();
            forward.push(editor.scrub());
        }
        assert_eq!(forward, vec![10, 30, 45, 45]);

        editor.jump_prev_fixture();
        assert_eq!(editor.scrub(), 30);
        editor.jump_prev_fixture();
        assert_eq!(editor.scrub(), 10);
        editor.jump_prev_fixture();
        assert_eq!(editor.scrub(), 0);
    }

    #[test]
    fn test_syncing_pick_moves_scrub() {
        let mut editor = editor(&[10, 20, 15]);
        editor.set_syncing(true);

        editor.pick_fixture(Some(2));
        assert_eq!(editor.scrub(), 30);
        assert!(!editor.have_scrubbed());
    }

    #[test]
    fn test_undo_redo_edits() {
        let mut editor = editor(&[10, 10]);

        editor.pick_fixture(Some(1));
        editor.remove_fixture().unwrap();
        assert_eq!(names(&editor), vec!["f0"]);

        editor.undo().unwrap();
        assert_eq!(names(&editor), vec!["f0", "f1"]);

        editor.redo().unwrap();
        assert_eq!(names(&editor), vec!["f0"]);
        assert!(matches!(editor.redo(), Err(EditorError::History(HistoryError::NothingToRedo))));
    }

    #[test]
    fn test_edit_fixture_captures_camera() {
        let mut editor = editor(&[10]);
        let camera = StandIn::new(Pose::new(Point::new(3.0, 4.0, 5.0), Angle::default()));

        assert!(!editor.edit_fixture(&camera).unwrap());
        editor.pick_fixture(Some(0));
        assert!(editor.edit_fixture(&camera).unwrap());

        let profile = editor.session.control.current().unwrap();
        assert_eq!(profile.evaluate(0, 0.0, Pose::default()).point, Point::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_playback_moves_scrub() {
        let mut editor = editor(&[5]);
        let mut subject = StandIn::default();

        assert_eq!(editor.toggle_playback(&mut subject).unwrap(), RunState::Running);
        editor.update(3, 0.0, &mut subject, &FlightInput::default());
        assert_eq!(editor.scrub(), 3);

        editor.update(2, 0.0, &mut subject, &FlightInput::default());
        assert_eq!(editor.session.mode(), SessionMode::Idle);
        assert_eq!(editor.scrub(), 5);
    }

    #[test]
    fn test_flight_speed_only_while_flying() {
        let mut editor = editor(&[10]);

        editor.adjust_flight_speed(1.0);
        assert_eq!(editor.session.flight().speed(), 1.0);

        editor.toggle_flight();
        editor.adjust_flight_speed(-3.0);
        assert!((editor.session.flight().speed() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_bad_speed_step_keeps_speed() {
        let config = EditorConfig {
            flight_speed_step: f32::NAN,
            ..EditorConfig::default()
        };
        let mut editor = CameraEditor::new(config);

        editor.toggle_flight();
        editor.adjust_flight_speed(1.0);
        assert_eq!(editor.session.flight().speed(), 1.0);
    }

    #[test]
    fn test_flight_sync_reports_mutation() {
        let mut editor = editor(&[10, 10]);
        let mut subject = StandIn::default();
        let forward = FlightInput {
            forward: 1.0,
            ..Default::default()
        };

        editor.set_syncing(true);
        editor.pick_fixture(Some(0));
        editor.scrub_to(4);
        editor.toggle_flight();
        editor.session.take_events();

        editor.update(0, 0.0, &mut subject, &forward);

        let profile = editor.session.control.current().unwrap();
        let moved = profile.evaluate(0, 0.0, Pose::default()).point;
        assert!((moved.z - 0.1).abs() < 1e-6);
        assert_eq!(
            editor.session.take_events(),
            vec![CameraEvent::ProfileMutated {
                destination: Destination::Client("editor".into()),
            }]
        );

        editor.update(0, 0.0, &mut subject, &FlightInput::default());
        assert!(editor.session.take_events().is_empty());
    }

    #[test]
    fn test_open_and_close_restore_camera() {
        let mut editor = editor(&[10]);
        let mut subject = StandIn::default();
        editor.session.control.set_roll_and_fov(2.0, 80.0);

        editor.toggle_flight();
        editor.open(&subject);
        assert!(!editor.session.is_flying());
        assert!(editor.session.runner().outside().is_some());

        editor.update(0, 0.0, &mut subject, &FlightInput::default());
        assert_eq!(editor.session.control.fov(), 70.0);

        editor.close();
        assert_eq!((editor.session.control.roll(), editor.session.control.fov()), (2.0, 80.0));
        assert!(editor.session.runner().outside().is_none());
        assert!(editor
            .session
            .take_events()
            .contains(&CameraEvent::OutsideChanged { active: false }));
    }

    #[test]
    fn test_invalid_aspect_ratio_keeps_previous() {
        let mut editor = editor(&[10]);

        assert_eq!(editor.set_aspect_ratio("2.39"), 2.39);
        assert_eq!(editor.set_aspect_ratio("cinema"), 2.39);
    }
}
