// SPDX-License-Identifier: MIT OR Apache-2.0
//! Binding between poses and the actor the camera is attached to.

use crate::pose::Pose;

/// Something whose location, orientation and field of view can be driven
/// by a camera pose.
///
/// The host implements this for the operator's avatar.
pub trait CameraSubject {
    /// Read the subject's current pose
    fn capture(&self) -> Pose;

    /// Overwrite the subject's pose
    fn apply(&mut self, pose: &Pose);
}

/// Synthetic stand-in actor used when the camera is detached from the
/// operator ("outside" mode)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StandIn {
    pose: Pose,
}

impl StandIn {
    /// Spawn a stand-in at the given pose
    pub fn new(pose: Pose) -> Self {
        Self { pose }
    }

    /// Current pose of the stand-in
    pub fn pose(&self) -> Pose {
        self.pose
    }
}

impl CameraSubject for StandIn {
    fn capture(&self) -> Pose {
        self.pose
    }

    fn apply(&mut self, pose: &Pose) {
        self.pose = *pose;
    }
}
