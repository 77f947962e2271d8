// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera session: the context object that owns the loaded profiles, the
//! runner and the flight controller.
//!
//! Exactly one of playback or flight drives the camera at a time, tracked
//! by [`SessionMode`].

use crate::control::CameraControl;
use crate::error::{ProfileError, StoreError};
use crate::events::{CameraEvent, EventQueue, StopReason};
use crate::flight::{Flight, FlightInput};
use crate::modifier::{HostModifiers, PoseModifier};
use crate::pose::Pose;
use crate::runner::{RunState, Runner};
use crate::store::ProfileStore;
use crate::subject::CameraSubject;
use crate::Tick;

/// Who is driving the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// Nothing drives the camera
    #[default]
    Idle,
    /// The runner plays the current profile
    Playing,
    /// The operator flies the camera by hand
    Flying,
}

/// Session state shared by the editing surface and the playback driver
#[derive(Debug, Default)]
pub struct CameraSession {
    /// Loaded profiles
    pub control: CameraControl,
    runner: Runner,
    flight: Flight,
    mode: SessionMode,
    events: EventQueue,
    host: HostModifiers,
}

impl CameraSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Who drives the camera right now
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Playback runner
    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Flight controller
    pub fn flight(&self) -> &Flight {
        &self.flight
    }

    /// Mutable flight controller (speed changes)
    pub fn flight_mut(&mut self) -> &mut Flight {
        &mut self.flight
    }

    /// Modifiers the host runs after every profile evaluation
    pub fn host_modifiers(&self) -> &HostModifiers {
        &self.host
    }

    /// Mutable host modifiers
    pub fn host_modifiers_mut(&mut self) -> &mut HostModifiers {
        &mut self.host
    }

    /// Whether flight is enabled
    pub fn is_flying(&self) -> bool {
        self.mode == SessionMode::Flying
    }

    /// Take pending events in the order they happened
    pub fn take_events(&mut self) -> Vec<CameraEvent> {
        self.events.take()
    }

    /// Queue an event on behalf of a collaborator
    pub fn emit(&mut self, event: CameraEvent) {
        self.events.push(event);
    }

    /// Tell observers the current profile changed
    pub fn notify_mutated(&mut self) {
        if let Some(destination) = self.control.current_destination().cloned() {
            self.events.push(CameraEvent::ProfileMutated { destination });
        }
    }

    /// Start or stop playback of the current profile.
    ///
    /// Starting while flying turns flight off first.
    pub fn toggle_playback(&mut self, start_tick: Tick) -> Result<RunState, ProfileError> {
        let profile = self.control.current().ok_or(ProfileError::NoProfile)?;

        if self.mode == SessionMode::Flying {
            self.mode = SessionMode::Idle;
            self.events.push(CameraEvent::FlightChanged { enabled: false });
        }

        let state = self.runner.toggle(profile, start_tick, &mut self.events);
        self.mode = match state {
            RunState::Running => SessionMode::Playing,
            RunState::Stopped => SessionMode::Idle,
        };
        Ok(state)
    }

    /// Enable or disable flight. Enabling it interrupts playback.
    pub fn set_flight(&mut self, enabled: bool) {
        if enabled == self.is_flying() {
            return;
        }

        if enabled {
            self.runner.stop(StopReason::Interrupted, &mut self.events);
            self.mode = SessionMode::Flying;
        } else {
            self.mode = SessionMode::Idle;
        }

        tracing::debug!(enabled, speed = self.flight.speed(), "Flight toggled");
        self.events.push(CameraEvent::FlightChanged { enabled });
    }

    /// Flip flight on or off
    pub fn toggle_flight(&mut self) {
        self.set_flight(!self.is_flying());
    }

    /// Move the runner's tick counter and report the scrub
    pub fn seek(&mut self, tick: Tick) {
        self.runner.set_ticks(tick);
        self.events.push(CameraEvent::Scrubbed {
            tick,
            running: self.runner.is_running(),
        });
    }

    /// Advance one fixed simulation step
    pub fn step(&mut self) {
        if self.mode != SessionMode::Playing {
            return;
        }

        match self.control.current() {
            Some(profile) => self.runner.step(profile, &mut self.events),
            None => {
                self.runner.stop(StopReason::Interrupted, &mut self.events);
            }
        }

        if !self.runner.is_running() {
            self.mode = SessionMode::Idle;
        }
    }

    /// Per-frame update from the render callback.
    ///
    /// While flying, `input` is integrated into the camera pose. While
    /// playing, the profile is evaluated between the current tick and the
    /// next one using `fractional` and the host modifiers run last. Returns
    /// the pose that was applied.
    pub fn frame(&mut self, fractional: f32, subject: &mut dyn CameraSubject, input: &FlightInput) -> Option<Pose> {
        match self.mode {
            SessionMode::Idle => None,
            SessionMode::Flying => {
                let mut pose = self.camera_pose(subject);
                self.flight.animate(&mut pose, input);
                self.apply_to_camera(&pose, subject);
                Some(pose)
            }
            SessionMode::Playing => {
                let profile = self.control.current()?;
                let base = subject.capture();
                let mut pose = self.runner.render(profile, fractional, base);
                if let Some(context) = profile.context(self.runner.ticks(), fractional) {
                    pose = self.host.transform(pose, &context);
                }
                self.apply_to_camera(&pose, subject);
                Some(pose)
            }
        }
    }

    /// Evaluate the current profile at `tick` (clamped to the profile), run
    /// the host modifiers and put the camera there
    pub fn apply_at(&mut self, tick: Tick, fractional: f32, subject: &mut dyn CameraSubject) -> Option<Pose> {
        let profile = self.control.current()?;
        let tick = tick.min(profile.duration());
        let pose = profile.apply_with(tick, fractional, subject.capture(), &self.host);

        self.apply_to_camera(&pose, subject);
        Some(pose)
    }

    /// Pose of whatever the camera is attached to
    pub fn camera_pose(&self, subject: &dyn CameraSubject) -> Pose {
        match self.runner.outside() {
            Some(outside) => outside.capture(),
            None => subject.capture(),
        }
    }

    /// Move the camera onto a stand-in at the subject's pose
    pub fn attach_outside(&mut self, subject: &dyn CameraSubject) -> bool {
        self.runner.attach_outside(subject, &mut self.events)
    }

    /// Give the camera back to the subject
    pub fn detach_outside(&mut self) -> bool {
        self.runner.detach_outside(&mut self.events)
    }

    /// Stop everything, flush dirty profiles and unload them
    pub fn reset(&mut self, store: &mut dyn ProfileStore) -> Result<usize, StoreError> {
        self.runner.stop(StopReason::Interrupted, &mut self.events);
        self.set_flight(false);
        self.mode = SessionMode::Idle;
        self.control.reset(store)
    }

    fn apply_to_camera(&mut self, pose: &Pose, subject: &mut dyn CameraSubject) {
        match self.runner.outside_mut() {
            Some(outside) => outside.apply(pose),
            None => subject.apply(pose),
        }
        self.control.set_roll_and_fov(pose.angle.roll, pose.angle.fov);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Fixture;
    use crate::modifier::{Modifier, ModifierContext};
    use crate::pose::{Angle, Point};
    use crate::profile::{Destination, Profile};
    use crate::subject::StandIn;

    fn session(durations: &[Tick]) -> CameraSession {
        let mut profile = Profile::new(Destination::Client("session".into()));
        for (i, duration) in durations.iter().enumerate() {
            let pose = Pose::new(Point::new(i as f64, 0.0, 0.0), Angle::new(0.0, 0.0, 5.0, 50.0));
            profile.add(Fixture::idle(*duration, pose));
        }

        let mut session = CameraSession::new();
        session.control.add_profile(profile);
        session
    }

    #[test]
    fn test_toggle_without_profile() {
        let mut session = CameraSession::new();
        assert_eq!(session.toggle_playback(0), Err(ProfileError::NoProfile));
    }

    #[test]
    fn test_playback_returns_to_idle() {
        let mut session = session(&[2, 2]);

        session.toggle_playback(0).unwrap();
        assert_eq!(session.mode(), SessionMode::Playing);
        for _ in 0..4 {
            session.step();
        }

        assert_eq!(session.mode(), SessionMode::Idle);
        assert_eq!(session.runner().ticks(), 4);
    }

    #[test]
    fn test_flight_interrupts_playback() {
        let mut session = session(&[20]);

        session.toggle_playback(0).unwrap();
        session.set_flight(true);

        assert_eq!(session.mode(), SessionMode::Flying);
        assert!(!session.runner().is_running());

        let events = session.take_events();
        assert!(events.contains(&CameraEvent::PlaybackStopped { tick: 0, reason: StopReason::Interrupted }));
        assert_eq!(events.last(), Some(&CameraEvent::FlightChanged { enabled: true }));
    }

    #[test]
    fn test_playback_turns_flight_off() {
        let mut session = session(&[20]);

        session.set_flight(true);
        session.toggle_playback(0).unwrap();

        assert_eq!(session.mode(), SessionMode::Playing);
    }

    #[test]
    fn test_frame_applies_profile_to_subject() {
        let mut session = session(&[10, 10]);
        let mut subject = StandIn::default();

        session.toggle_playback(12).unwrap();
        let pose = session.frame(0.5, &mut subject, &FlightInput::default()).unwrap();

        assert_eq!(pose.point.x, 1.0);
        assert_eq!(subject.pose(), pose);
        assert_eq!(session.control.fov(), 50.0);
        assert_eq!(session.control.roll(), 5.0);
    }

    #[test]
    fn test_outside_receives_pose_instead_of_subject() {
        let mut session = session(&[10]);
        let mut subject = StandIn::default();

        session.attach_outside(&subject);
        session.apply_at(3, 0.0, &mut subject).unwrap();

        assert_eq!(subject.pose(), Pose::default());
        assert_eq!(session.runner().outside().map(|o| o.pose().point.x), Some(0.0));
        assert_eq!(session.runner().outside().map(|o| o.pose().angle.fov), Some(50.0));
    }

    #[test]
    fn test_flying_moves_subject() {
        let mut session = session(&[10]);
        let mut subject = StandIn::default();

        session.set_flight(true);
        session.flight_mut().set_speed(10.0);
        session.frame(0.0, &mut subject, &FlightInput { forward: 1.0, ..Default::default() });

        assert!((subject.pose().point.z - 1.0).abs() < 1e-6);
    }

    struct Doubler;

    impl PoseModifier for Doubler {
        fn transform(&self, mut pose: Pose, _context: &ModifierContext) -> Pose {
            pose.point.x *= 2.0;
            pose
        }
    }

    #[test]
    fn test_host_modifiers_run_after_profile() {
        let mut session = session(&[10]);
        let mut subject = StandIn::default();

        if let Some(profile) = session.control.current_mut() {
            profile.edit(0, |f| f.modifiers.push(Modifier::translate(Point::new(1.0, 0.0, 0.0))));
            profile.modifiers.push(Modifier::translate(Point::new(2.0, 0.0, 0.0)));
        }
        session.host_modifiers_mut().push(Doubler);

        assert_eq!(session.apply_at(3, 0.0, &mut subject).map(|p| p.point.x), Some(6.0));
        assert_eq!(subject.pose().point.x, 6.0);

        session.toggle_playback(0).unwrap();
        let pose = session.frame(0.5, &mut subject, &FlightInput::default()).unwrap();
        assert_eq!(pose.point.x, 6.0);

        session.host_modifiers_mut().clear();
        assert_eq!(session.apply_at(3, 0.0, &mut subject).map(|p| p.point.x), Some(3.0));
    }
}
