// SPDX-License-Identifier: MIT OR Apache-2.0
//! Post-processing transforms applied to a pose after a fixture produced it.
//!
//! Modifiers run in list order. A fixture's own modifiers run first, then
//! the profile-wide stack, then any [`HostModifiers`] the session holds.

use crate::pose::{Angle, Point, Pose};
use crate::Tick;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timing information handed to every modifier
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModifierContext {
    /// Global tick being evaluated
    pub tick: Tick,
    /// Tick local to the owning fixture
    pub local_tick: Tick,
    /// Sub-tick interpolation factor in `[0, 1)`
    pub fractional: f32,
    /// Duration of the owning fixture
    pub duration: Tick,
}

impl ModifierContext {
    /// Global time including the fractional offset
    pub fn time(&self) -> f64 {
        self.tick as f64 + f64::from(self.fractional)
    }
}

/// A `Pose -> Pose` transform.
///
/// Hosts can implement this for their own modifiers and chain them after
/// [`crate::Profile::apply`].
pub trait PoseModifier {
    /// Transform the incoming pose
    fn transform(&self, pose: Pose, context: &ModifierContext) -> Pose;
}

/// Built-in modifier kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Shift the location by a fixed offset
    Translate {
        /// Offset added to the point
        offset: Point,
    },
    /// Add a fixed rotation and field of view delta
    Angle {
        /// Delta added to the angle
        delta: Angle,
    },
    /// Deterministic hand-held shake
    Shake {
        /// Maximum rotation in degrees
        amplitude: f32,
        /// Ticks per oscillation
        period: f32,
    },
}

/// A modifier entry in a stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    /// Disabled modifiers are skipped
    pub enabled: bool,
    /// What the modifier does
    pub kind: ModifierKind,
}

impl Modifier {
    /// Create an enabled modifier
    pub fn new(kind: ModifierKind) -> Self {
        Self { enabled: true, kind }
    }

    /// Translate modifier
    pub fn translate(offset: Point) -> Self {
        Self::new(ModifierKind::Translate { offset })
    }

    /// Angle modifier
    pub fn angle(delta: Angle) -> Self {
        Self::new(ModifierKind::Angle { delta })
    }

    /// Shake modifier
    pub fn shake(amplitude: f32, period: f32) -> Self {
        Self::new(ModifierKind::Shake { amplitude, period })
    }
}

impl PoseModifier for Modifier {
    fn transform(&self, mut pose: Pose, context: &ModifierContext) -> Pose {
        if !self.enabled {
            return pose;
        }

        match &self.kind {
            ModifierKind::Translate { offset } => {
                pose.point = pose.point.add(*offset);
            }
            ModifierKind::Angle { delta } => {
                pose.angle = pose.angle.add(*delta);
            }
            ModifierKind::Shake { amplitude, period } => {
                if *period > 0.0 {
                    let phase = context.time() / f64::from(*period) * std::f64::consts::TAU;
                    pose.angle.yaw += amplitude * phase.sin() as f32;
                    pose.angle.pitch += amplitude * (phase * 0.5).cos() as f32 * 0.5;
                }
            }
        }

        pose
    }
}

/// Ordered list of modifiers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifierStack {
    modifiers: Vec<Modifier>,
}

impl ModifierStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a modifier
    pub fn push(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    /// Remove the modifier at `index`
    pub fn remove(&mut self, index: usize) -> Option<Modifier> {
        (index < self.modifiers.len()).then(|| self.modifiers.remove(index))
    }

    /// Mutable access to a modifier
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Modifier> {
        self.modifiers.get_mut(index)
    }

    /// All modifiers in order
    pub fn iter(&self) -> impl Iterator<Item = &Modifier> {
        self.modifiers.iter()
    }

    /// Number of modifiers
    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    /// Whether the stack has no modifiers
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Run the stack, then a host-supplied modifier
    pub fn apply_with(&self, pose: Pose, context: &ModifierContext, host: &dyn PoseModifier) -> Pose {
        host.transform(self.transform(pose, context), context)
    }
}

impl PoseModifier for ModifierStack {
    fn transform(&self, pose: Pose, context: &ModifierContext) -> Pose {
        self.modifiers
            .iter()
            .fold(pose, |pose, modifier| modifier.transform(pose, context))
    }
}

/// Host-supplied modifiers run after everything a profile defines.
///
/// These are not part of the profile and are never serialized.
#[derive(Default)]
pub struct HostModifiers {
    modifiers: Vec<Box<dyn PoseModifier + Send + Sync>>,
}

impl HostModifiers {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a modifier
    pub fn push(&mut self, modifier: impl PoseModifier + Send + Sync + 'static) {
        self.modifiers.push(Box::new(modifier));
    }

    /// Drop every host modifier
    pub fn clear(&mut self) {
        self.modifiers.clear();
    }

    /// Number of modifiers
    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    /// Whether no host modifiers are installed
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }
}

impl fmt::Debug for HostModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostModifiers").field("len", &self.modifiers.len()).finish()
    }
}

impl PoseModifier for HostModifiers {
    fn transform(&self, pose: Pose, context: &ModifierContext) -> Pose {
        self.modifiers
            .iter()
            .fold(pose, |pose, modifier| modifier.transform(pose, context))
    }
}
