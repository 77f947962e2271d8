// SPDX-License-Identifier: MIT OR Apache-2.0
//! Aperture camera editor.
//!
//! The headless editing surface over [`aperture_camera`]:
//! - Fixture selection, scrubbing and editing commands
//! - Undo/redo of profile edits
//! - Editor configuration
//! - A fixed-timestep playback driver

pub mod clock;
pub mod config;
pub mod driver;
pub mod editor;
pub mod history;

pub use clock::FixedClock;
pub use config::{ConfigError, EditorConfig};
pub use driver::{DriverError, PlaybackReport};
pub use editor::{CameraEditor, EditorError};
pub use history::{History, HistoryError};
