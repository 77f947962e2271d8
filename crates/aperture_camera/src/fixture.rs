// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera fixtures: timed segments that produce a pose.
//!
//! Every fixture owns a duration in ticks and a variant payload. The set of
//! variants is closed; adding one means extending [`FixtureKind`] and the
//! matches below.

use crate::error::ProfileError;
use crate::modifier::ModifierStack;
use crate::pose::{hermite, Angle, Point, Pose};
use crate::subject::CameraSubject;
use crate::Tick;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest duration a single fixture may have, in ticks
pub const MAX_DURATION: Tick = u32::MAX as Tick;

/// Unique identifier for a fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixtureId(pub Uuid);

impl FixtureId {
    /// Create a new random fixture ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FixtureId {
    fn default() -> Self {
        Self::new()
    }
}

/// How a path fixture moves between its points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PathInterpolation {
    /// Straight segments
    #[default]
    Linear,
    /// Smooth curve through every point
    Hermite,
}

/// Variant payload of a fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FixtureKind {
    /// Holds a single pose for the whole duration
    Idle {
        /// Pose held by the camera
        pose: Pose,
    },
    /// Travels through a list of poses spread evenly over the duration
    Path {
        /// Waypoints in travel order
        points: Vec<Pose>,
        /// Interpolation between waypoints
        interpolation: PathInterpolation,
    },
    /// Orbits around a center while looking at it
    Circular {
        /// Orbit center
        center: Point,
        /// Horizontal distance from the center
        distance: f64,
        /// Height above the center
        height: f64,
        /// Degrees swept over the whole duration
        circles: f32,
        /// Camera pitch
        pitch: f32,
        /// Camera field of view
        fov: f32,
    },
}

impl FixtureKind {
    /// Display name of the variant
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle { .. } => "Idle",
            Self::Path { .. } => "Path",
            Self::Circular { .. } => "Circular",
        }
    }
}

/// A timed segment of a camera profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Unique fixture ID
    pub id: FixtureId,
    /// Display name
    pub name: String,
    /// Length in ticks
    duration: Tick,
    /// Variant payload
    pub kind: FixtureKind,
    /// Modifiers applied to this fixture's output only
    #[serde(default)]
    pub modifiers: ModifierStack,
}

impl Fixture {
    /// Create a new fixture. Durations above [`MAX_DURATION`] are capped.
    pub fn new(duration: Tick, kind: FixtureKind) -> Self {
        Self {
            id: FixtureId::new(),
            name: String::new(),
            duration: duration.min(MAX_DURATION),
            kind,
            modifiers: ModifierStack::new(),
        }
    }

    /// Idle fixture holding `pose`
    pub fn idle(duration: Tick, pose: Pose) -> Self {
        Self::new(duration, FixtureKind::Idle { pose })
    }

    /// Path fixture through `points`
    pub fn path(duration: Tick, points: Vec<Pose>, interpolation: PathInterpolation) -> Self {
        Self::new(duration, FixtureKind::Path { points, interpolation })
    }

    /// Circular fixture around `center`
    pub fn circular(duration: Tick, center: Point, distance: f64, circles: f32) -> Self {
        Self::new(
            duration,
            FixtureKind::Circular {
                center,
                distance,
                height: 0.0,
                circles,
                pitch: 0.0,
                fov: crate::pose::DEFAULT_FOV,
            },
        )
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Length in ticks
    pub fn duration(&self) -> Tick {
        self.duration
    }

    /// Change the length. Negative values and values above
    /// [`MAX_DURATION`] are rejected and leave the duration untouched.
    pub fn set_duration(&mut self, duration: i64) -> Result<(), ProfileError> {
        let ticks = Tick::try_from(duration).map_err(|_| ProfileError::NegativeDuration(duration))?;
        if ticks > MAX_DURATION {
            return Err(ProfileError::DurationTooLong(duration));
        }

        self.duration = ticks;
        Ok(())
    }

    /// Copy with a fresh ID and no shared state with `self`
    pub fn duplicate(&self) -> Self {
        Self {
            id: FixtureId::new(),
            ..self.clone()
        }
    }

    /// Pose contribution at `local_tick` plus a sub-tick `fractional`
    /// offset.
    ///
    /// `pose` is the incoming pose; variants that only control part of the
    /// camera leave the rest of it alone.
    pub fn evaluate(&self, local_tick: Tick, fractional: f32, pose: Pose) -> Pose {
        match &self.kind {
            FixtureKind::Idle { pose } => *pose,
            FixtureKind::Path { points, interpolation } => {
                evaluate_path(points, *interpolation, self.progress(local_tick, fractional), pose)
            }
            FixtureKind::Circular { center, distance, height, circles, pitch, fov } => {
                let progress = self.progress(local_tick, fractional);
                let theta = f64::from(circles * progress).to_radians();

                let point = Point::new(
                    center.x - theta.sin() * distance,
                    center.y + height,
                    center.z + theta.cos() * distance,
                );
                let yaw = circles * progress + 180.0;

                Pose::new(point, Angle::new(yaw, *pitch, pose.angle.roll, *fov))
            }
        }
    }

    /// Overwrite the authoring payload with the subject's current pose
    pub fn capture_from(&mut self, subject: &dyn CameraSubject) {
        let captured = subject.capture();

        match &mut self.kind {
            FixtureKind::Idle { pose } => *pose = captured,
            FixtureKind::Path { points, .. } => match points.last_mut() {
                Some(last) => *last = captured,
                None => points.push(captured),
            },
            FixtureKind::Circular { center, pitch, fov, .. } => {
                *center = captured.point;
                *pitch = captured.angle.pitch;
                *fov = captured.angle.fov;
            }
        }
    }

    /// Normalized position inside the fixture, `[0, 1]`
    fn progress(&self, local_tick: Tick, fractional: f32) -> f32 {
        if self.duration == 0 {
            return 1.0;
        }

        ((local_tick as f32 + fractional) / self.duration as f32).clamp(0.0, 1.0)
    }
}

fn evaluate_path(points: &[Pose], interpolation: PathInterpolation, progress: f32, pose: Pose) -> Pose {
    match points {
        [] => pose,
        [only] => *only,
        _ => {
            let last = points.len() - 1;
            let scaled = progress * last as f32;
            let index = (scaled.floor() as usize).min(last - 1);
            let t = scaled - index as f32;

            let a = &points[index];
            let b = &points[index + 1];

            match interpolation {
                PathInterpolation::Linear => a.lerp(b, t),
                PathInterpolation::Hermite => {
                    let before = &points[index.saturating_sub(1)];
                    let after = &points[(index + 2).min(last)];
                    let t64 = f64::from(t);

                    let point = Point::new(
                        hermite(before.point.x, a.point.x, b.point.x, after.point.x, t64),
                        hermite(before.point.y, a.point.y, b.point.y, after.point.y, t64),
                        hermite(before.point.z, a.point.z, b.point.z, after.point.z, t64),
                    );

                    Pose::new(point, a.angle.lerp(b.angle, t))
                }
            }
        }
    }
}
