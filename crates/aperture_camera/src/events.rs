// SPDX-License-Identifier: MIT OR Apache-2.0
//! Notifications emitted by the camera core.

use crate::profile::Destination;
use crate::Tick;

/// Why playback stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The operator toggled playback off
    Toggled,
    /// Playback reached the end of the profile
    Completed,
    /// Something else took over the camera (flight, profile reset)
    Interrupted,
}

/// A discrete event for observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraEvent {
    /// Playback started at the given tick
    PlaybackStarted {
        /// Start tick
        tick: Tick,
    },
    /// Playback stopped at the given tick
    PlaybackStopped {
        /// Tick at which playback halted
        tick: Tick,
        /// What stopped it
        reason: StopReason,
    },
    /// The operator scrubbed to a tick
    Scrubbed {
        /// New scrub position
        tick: Tick,
        /// Whether playback was running at the time
        running: bool,
    },
    /// A profile's fixtures or modifiers changed
    ProfileMutated {
        /// Profile that changed
        destination: Destination,
    },
    /// The camera was moved to or from the stand-in actor
    OutsideChanged {
        /// Whether the stand-in is now active
        active: bool,
    },
    /// Flight mode was switched
    FlightChanged {
        /// Whether flight is now enabled
        enabled: bool,
    },
}

/// FIFO of pending events, drained by the host once per frame
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: Vec<CameraEvent>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event
    pub fn push(&mut self, event: CameraEvent) {
        tracing::trace!(?event, "camera event");
        self.pending.push(event);
    }

    /// Take all pending events in the order they happened
    pub fn take(&mut self) -> Vec<CameraEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Peek at pending events
    pub fn pending(&self) -> &[CameraEvent] {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_drains_in_order() {
        let mut queue = EventQueue::new();
        queue.push(CameraEvent::PlaybackStarted { tick: 0 });
        queue.push(CameraEvent::Scrubbed { tick: 4, running: true });

        assert_eq!(queue.pending().len(), 2);
        assert_eq!(
            queue.take(),
            vec![
                CameraEvent::PlaybackStarted { tick: 0 },
                CameraEvent::Scrubbed { tick: 4, running: true },
            ]
        );
        assert!(queue.take().is_empty());
    }
}
