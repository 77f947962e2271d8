// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless playback driver.
//!
//! Builds a sample profile, opens the editor on a stand-in camera and plays
//! the profile to completion against a [`FixedClock`], logging the pose
//! after every frame.

use crate::clock::FixedClock;
use crate::config::{ConfigError, EditorConfig};
use crate::editor::{CameraEditor, EditorError};
use aperture_camera::{
    Angle, CameraEvent, Destination, Fixture, FlightInput, MemoryStore, Modifier, PathInterpolation, Point, Pose,
    Profile, RunState, StandIn, StoreError, Tick,
};
use std::path::Path;
use thiserror::Error;

/// Frames rendered per second of simulated wall time
const FRAME_RATE: f64 = 60.0;

/// Driver errors
#[derive(Debug, Error)]
pub enum DriverError {
    /// Config could not be loaded
    #[error("Failed to load config: {0}")]
    Config(#[from] ConfigError),

    /// An editor command failed
    #[error("Editor command failed: {0}")]
    Editor(#[from] EditorError),

    /// Flushing profiles at shutdown failed
    #[error("Failed to save profiles: {0}")]
    Store(#[from] StoreError),
}

/// Result type for the driver
pub type Result<T> = std::result::Result<T, DriverError>;

/// What a playback run did
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackReport {
    /// Ticks the runner advanced
    pub ticks: Tick,
    /// Frames rendered
    pub frames: u64,
    /// Pose applied on the last frame
    pub final_pose: Option<Pose>,
    /// Profiles flushed to the store at shutdown
    pub saved: usize,
}

/// Profile used by the demo
pub fn sample_profile() -> Profile {
    let start = Pose::new(Point::new(0.0, 64.0, 0.0), Angle::default());
    let end = Pose::new(Point::new(16.0, 70.0, 8.0), Angle::new(90.0, 15.0, 0.0, 60.0));

    let mut profile = Profile::new(Destination::Client("demo".into()));
    profile.add(Fixture::idle(20, start).with_name("establish"));
    profile.add(Fixture::path(40, vec![start, end], PathInterpolation::Hermite).with_name("dolly"));

    let mut orbit = Fixture::circular(60, Point::new(16.0, 64.0, 8.0), 12.0, 360.0).with_name("orbit");
    orbit.modifiers.push(Modifier::shake(0.5, 30.0));
    profile.add(orbit);
    profile
}

/// Load the config at `path`, or use defaults
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    Ok(match path {
        Some(path) => EditorConfig::load_or_default(path)?,
        None => EditorConfig::default(),
    })
}

/// Play `profile` to completion in a fresh editor
pub fn play(config: EditorConfig, profile: Profile) -> Result<PlaybackReport> {
    let mut editor = CameraEditor::new(config);
    let mut camera = StandIn::default();
    let mut clock = FixedClock::new();
    let mut store = MemoryStore::new();

    editor.session.control.add_profile(profile);
    editor.open(&camera);

    if editor.toggle_playback(&mut camera)? == RunState::Stopped {
        tracing::warn!("Profile is empty, nothing to play");
    }

    let frame_delta = 1.0 / FRAME_RATE;
    let input = FlightInput::default();
    let mut frames = 0;
    let mut final_pose = None;

    while editor.session.runner().is_running() {
        let steps = clock.update(frame_delta);
        let pose = editor.update(steps, clock.fractional(), &mut camera, &input);
        frames += 1;

        if let Some(pose) = pose {
            if steps > 0 {
                tracing::debug!(
                    tick = editor.scrub(),
                    x = pose.point.x,
                    y = pose.point.y,
                    z = pose.point.z,
                    yaw = pose.angle.yaw,
                    pitch = pose.angle.pitch,
                    fov = pose.angle.fov,
                    "Camera pose"
                );
            }
            final_pose = Some(pose);
        }
    }

    for event in editor.session.take_events() {
        if let CameraEvent::PlaybackStopped { tick, reason } = event {
            tracing::info!(tick, ?reason, frames, "Playback finished");
        }
    }

    let ticks = editor.session.runner().ticks();
    editor.close();
    let saved = editor.session.reset(&mut store)?;

    Ok(PlaybackReport {
        ticks,
        frames,
        final_pose,
        saved,
    })
}
