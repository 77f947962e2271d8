// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe camera animation for Aperture.
//!
//! This crate provides the camera timeline core:
//! - Camera profiles: ordered timelines of fixtures
//! - Fixture variants (idle, path, circular)
//! - Pose modifiers
//! - Playback runner driven by a fixed-timestep clock
//! - Free-fly camera control
//!
//! ## Architecture
//!
//! A [`Profile`] resolves a global tick to the fixture that owns it and
//! the tick local to that fixture. The fixture produces a [`Pose`], the
//! modifier stacks transform it, and the result is applied to a
//! [`CameraSubject`] supplied by the host. A [`CameraSession`] ties the
//! loaded profiles, the [`Runner`] and the [`Flight`] controller together.

pub mod control;
pub mod error;
pub mod events;
pub mod fixture;
pub mod flight;
pub mod modifier;
pub mod pose;
pub mod profile;
pub mod runner;
pub mod session;
pub mod store;
pub mod subject;

/// One fixed simulation step, the unit of timeline addressing
pub type Tick = u64;

pub use control::CameraControl;
pub use error::{ProfileError, StoreError};
pub use events::{CameraEvent, EventQueue, StopReason};
pub use fixture::{Fixture, FixtureId, FixtureKind, PathInterpolation, MAX_DURATION};
pub use flight::{Flight, FlightInput};
pub use modifier::{HostModifiers, Modifier, ModifierContext, ModifierKind, ModifierStack, PoseModifier};
pub use pose::{Angle, Point, Pose};
pub use profile::{Destination, Profile, SharedProfile};
pub use runner::{RunState, Runner};
pub use session::{CameraSession, SessionMode};
pub use store::{MemoryStore, ProfileStore};
pub use subject::{CameraSubject, StandIn};
