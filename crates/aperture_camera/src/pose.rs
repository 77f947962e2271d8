// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera pose value types.

use crate::subject::CameraSubject;
use serde::{Deserialize, Serialize};

/// Field of view used when nothing else was specified
pub const DEFAULT_FOV: f32 = 70.0;

/// Position in world units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate (up)
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component-wise sum
    pub fn add(self, other: Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Scale every component
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Linear interpolation towards `other`
    pub fn lerp(self, other: Point, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    /// Euclidean distance to `other`
    pub fn distance(self, other: Point) -> f64 {
        let (dx, dy, dz) = (other.x - self.x, other.y - self.y, other.z - self.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Angle {
    /// Rotation around the vertical axis
    pub yaw: f32,
    /// Up/down rotation
    pub pitch: f32,
    /// Rotation around the view axis
    pub roll: f32,
    /// Vertical field of view
    pub fov: f32,
}

impl Angle {
    /// Create a new angle
    pub const fn new(yaw: f32, pitch: f32, roll: f32, fov: f32) -> Self {
        Self { yaw, pitch, roll, fov }
    }

    /// Component-wise sum
    pub fn add(self, other: Angle) -> Self {
        Self::new(
            self.yaw + other.yaw,
            self.pitch + other.pitch,
            self.roll + other.roll,
            self.fov + other.fov,
        )
    }

    /// Linear interpolation towards `other`
    pub fn lerp(self, other: Angle, t: f32) -> Self {
        Self::new(
            lerp(self.yaw, other.yaw, t),
            lerp(self.pitch, other.pitch, t),
            lerp(self.roll, other.roll, t),
            lerp(self.fov, other.fov, t),
        )
    }

    /// Unit vector the camera looks along.
    ///
    /// Yaw 0 faces +Z and increases clockwise when viewed from above,
    /// positive pitch looks down.
    pub fn look_vector(self) -> Point {
        let yaw = f64::from(self.yaw).to_radians();
        let pitch = f64::from(self.pitch).to_radians();

        Point::new(-yaw.sin() * pitch.cos(), -pitch.sin(), yaw.cos() * pitch.cos())
    }
}

impl Default for Angle {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, DEFAULT_FOV)
    }
}

/// Camera location and orientation at an instant
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Camera location
    pub point: Point,
    /// Camera orientation and field of view
    pub angle: Angle,
}

impl Pose {
    /// Create a new pose
    pub const fn new(point: Point, angle: Angle) -> Self {
        Self { point, angle }
    }

    /// Snapshot the current pose of a subject
    pub fn capture(subject: &dyn CameraSubject) -> Self {
        subject.capture()
    }

    /// Push this pose onto a subject
    pub fn apply(&self, subject: &mut dyn CameraSubject) {
        subject.apply(self);
    }

    /// Interpolate both location and orientation
    pub fn lerp(&self, other: &Pose, t: f32) -> Self {
        Self {
            point: self.point.lerp(other.point, f64::from(t)),
            angle: self.angle.lerp(other.angle, t),
        }
    }
}

/// Linear interpolation between two floats
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite spline interpolation through `p1..p2` with neighbours `p0` and `p3`
pub fn hermite(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let m1 = (p2 - p0) * 0.5;
    let m2 = (p3 - p1) * 0.5;

    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    h00 * p1 + h10 * m1 + h01 * p2 + h11 * m2
}
