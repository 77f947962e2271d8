// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback state machine.
//!
//! The runner owns the tick counter. It advances by exactly one tick per
//! fixed simulation step; sub-tick time only ever reaches fixtures through
//! the fractional offset passed to [`Runner::render`]. Poses on whole ticks
//! are cached until the tick, the base pose or the profile changes.

use crate::events::{CameraEvent, EventQueue, StopReason};
use crate::pose::Pose;
use crate::profile::{Destination, Profile};
use crate::subject::{CameraSubject, StandIn};
use crate::Tick;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Not advancing
    #[default]
    Stopped,
    /// Advancing one tick per simulation step
    Running,
}

#[derive(Debug, Clone, PartialEq)]
struct CachedPose {
    ticks: Tick,
    destination: Destination,
    revision: u64,
    base: Pose,
    pose: Pose,
}

/// Drives a profile against the simulation clock
#[derive(Debug, Default)]
pub struct Runner {
    ticks: Tick,
    state: RunState,
    bound: Option<Destination>,
    outside: Option<StandIn>,
    cache: Option<CachedPose>,
}

impl Runner {
    /// Create a stopped runner at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Current playback state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Whether playback is advancing
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Current tick counter
    pub fn ticks(&self) -> Tick {
        self.ticks
    }

    /// Move the tick counter without changing the run state
    pub fn set_ticks(&mut self, ticks: Tick) {
        self.ticks = ticks;
    }

    /// Profile the runner was last started on
    pub fn bound(&self) -> Option<&Destination> {
        self.bound.as_ref()
    }

    /// Flip between stopped and running.
    ///
    /// Starting sets the tick counter to `start_tick`. A start at or past
    /// the end of the profile completes immediately. Stopping leaves the
    /// counter where it was.
    pub fn toggle(&mut self, profile: &Profile, start_tick: Tick, events: &mut EventQueue) -> RunState {
        match self.state {
            RunState::Stopped => {
                self.ticks = start_tick;
                self.state = RunState::Running;
                self.bound = Some(profile.destination().clone());

                tracing::info!(tick = start_tick, profile = %profile.destination(), "Playback started");
                events.push(CameraEvent::PlaybackStarted { tick: start_tick });

                if self.ticks >= profile.duration() {
                    self.halt(StopReason::Completed, events);
                }
            }
            RunState::Running => self.halt(StopReason::Toggled, events),
        }

        self.state
    }

    /// Stop playback if it is running
    pub fn stop(&mut self, reason: StopReason, events: &mut EventQueue) -> bool {
        if !self.is_running() {
            return false;
        }

        self.halt(reason, events);
        true
    }

    /// Advance one fixed simulation step
    pub fn step(&mut self, profile: &Profile, events: &mut EventQueue) {
        if !self.is_running() {
            return;
        }

        if self.bound.as_ref() != Some(profile.destination()) {
            tracing::warn!(profile = %profile.destination(), "Runner stepped with a different profile");
            self.halt(StopReason::Interrupted, events);
            return;
        }

        self.ticks += 1;

        if self.ticks >= profile.duration() {
            self.halt(StopReason::Completed, events);
        }
    }

    /// Pose for the current tick on top of `base`, recomputed only when
    /// the tick counter, the base or the profile changed since the last call
    pub fn current_pose(&mut self, profile: &Profile, base: Pose) -> Pose {
        if let Some(cache) = &self.cache {
            if cache.ticks == self.ticks
                && cache.revision == profile.revision()
                && cache.base == base
                && &cache.destination == profile.destination()
            {
                return cache.pose;
            }
        }

        let pose = profile.apply(self.ticks, 0.0, base);
        self.cache = Some(CachedPose {
            ticks: self.ticks,
            destination: profile.destination().clone(),
            revision: profile.revision(),
            base,
            pose,
        });
        pose
    }

    /// Last pose computed by [`Self::current_pose`]
    pub fn position(&self) -> Option<Pose> {
        self.cache.as_ref().map(|cache| cache.pose)
    }

    /// Pose for a render frame between two ticks. Whole ticks, and every
    /// frame while stopped, go through [`Self::current_pose`].
    pub fn render(&mut self, profile: &Profile, fractional: f32, base: Pose) -> Pose {
        if !self.is_running() || fractional == 0.0 {
            return self.current_pose(profile, base);
        }

        profile.apply(self.ticks, fractional, base)
    }

    /// Move the camera onto a synthetic stand-in placed at the subject's
    /// current pose. Does nothing when already attached.
    pub fn attach_outside(&mut self, from: &dyn CameraSubject, events: &mut EventQueue) -> bool {
        if self.outside.is_some() {
            return false;
        }

        self.outside = Some(StandIn::new(from.capture()));
        tracing::debug!("Attached camera to stand-in");
        events.push(CameraEvent::OutsideChanged { active: true });
        true
    }

    /// Give the camera back to the operator. Does nothing when not
    /// attached.
    pub fn detach_outside(&mut self, events: &mut EventQueue) -> bool {
        if self.outside.take().is_none() {
            return false;
        }

        tracing::debug!("Detached camera from stand-in");
        events.push(CameraEvent::OutsideChanged { active: false });
        true
    }

    /// The stand-in, when attached
    pub fn outside(&self) -> Option<&StandIn> {
        self.outside.as_ref()
    }

    /// Mutable stand-in, when attached
    pub fn outside_mut(&mut self) -> Option<&mut StandIn> {
        self.outside.as_mut()
    }

    fn halt(&mut self, reason: StopReason, events: &mut EventQueue) {
        self.state = RunState::Stopped;

        tracing::info!(tick = self.ticks, ?reason, "Playback stopped");
        events.push(CameraEvent::PlaybackStopped { tick: self.ticks, reason });
    }
}
