// SPDX-License-Identifier: MIT OR Apache-2.0
//! Free-fly camera movement.
//!
//! Whether flight is active is owned by [`crate::session::SessionMode`];
//! this type only integrates input while the session says it should.

use crate::pose::{Point, Pose};

/// Slowest flight speed
pub const MIN_SPEED: f32 = 0.1;
/// Fastest flight speed
pub const MAX_SPEED: f32 = 50.0;
/// Amount one scroll notch changes the speed by
pub const SPEED_STEP: f32 = 0.1;

/// World units travelled per frame at speed 1.0
const BASE_STEP: f64 = 0.1;

/// Operator input sampled for a single frame.
///
/// Axes are in `[-1, 1]`; rotation deltas are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlightInput {
    /// Positive moves along the look direction
    pub forward: f32,
    /// Positive moves to the camera's right
    pub strafe: f32,
    /// Positive moves up
    pub vertical: f32,
    /// Yaw delta
    pub yaw: f32,
    /// Pitch delta
    pub pitch: f32,
    /// Roll delta
    pub roll: f32,
    /// Field of view delta
    pub zoom: f32,
}

/// Flight controller state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flight {
    speed: f32,
}

impl Flight {
    /// Create a controller at speed 1.0
    pub fn new() -> Self {
        Self { speed: 1.0 }
    }

    /// Current speed multiplier
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the speed, clamped to `[MIN_SPEED, MAX_SPEED]`. Non-finite
    /// speeds are ignored.
    pub fn set_speed(&mut self, speed: f32) {
        if !speed.is_finite() {
            return;
        }

        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Change the speed by one [`SPEED_STEP`] in the direction of
    /// `direction`'s sign
    pub fn adjust_speed(&mut self, direction: f32) {
        if direction == 0.0 || direction.is_nan() {
            return;
        }

        self.set_speed(self.speed + SPEED_STEP.copysign(direction));
    }

    /// Integrate one frame of input into `pose`
    pub fn animate(&self, pose: &mut Pose, input: &FlightInput) {
        let angle = &mut pose.angle;
        angle.yaw += input.yaw;
        angle.pitch = (angle.pitch + input.pitch).clamp(-90.0, 90.0);
        angle.roll += input.roll;
        angle.fov += input.zoom;

        let yaw = f64::from(angle.yaw).to_radians();
        let forward = Point::new(-yaw.sin(), 0.0, yaw.cos());
        let right = Point::new(-yaw.cos(), 0.0, -yaw.sin());
        let up = Point::new(0.0, 1.0, 0.0);

        let step = BASE_STEP * f64::from(self.speed);
        let velocity = forward
            .scale(f64::from(input.forward))
            .add(right.scale(f64::from(input.strafe)))
            .add(up.scale(f64::from(input.vertical)))
            .scale(step);

        pose.point = pose.point.add(velocity);
    }
}

impl Default for Flight {
    fn default() -> Self {
        Self::new()
    }
}
