// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixed-timestep clock.
//!
//! Converts variable frame deltas into whole simulation ticks plus the
//! fraction of the next tick already elapsed, which the renderer uses to
//! interpolate between ticks.

/// Simulation rate in ticks per second
pub const TICK_RATE: f64 = 20.0;

/// Most ticks run for one frame before the backlog is dropped
const MAX_STEPS: u32 = 8;

/// Fixed-timestep accumulator
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestep: f64,
    accumulated: f64,
    /// Time scale (1.0 = normal speed)
    pub time_scale: f32,
    /// Ticks produced since creation
    pub tick_count: u64,
}

impl FixedClock {
    /// Clock at [`TICK_RATE`]
    pub fn new() -> Self {
        Self::with_rate(TICK_RATE)
    }

    /// Clock at a custom rate in ticks per second
    pub fn with_rate(rate: f64) -> Self {
        Self {
            timestep: 1.0 / rate,
            accumulated: 0.0,
            time_scale: 1.0,
            tick_count: 0,
        }
    }

    /// Seconds per tick
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    /// Feed a frame delta in seconds; returns the number of ticks to run
    pub fn update(&mut self, delta_time: f64) -> u32 {
        self.accumulated += delta_time * self.time_scale as f64;

        let mut steps = 0;
        while self.accumulated >= self.timestep {
            self.accumulated -= self.timestep;
            steps += 1;

            if steps >= MAX_STEPS {
                tracing::warn!(dropped = self.accumulated, "Tick backlog dropped");
                self.accumulated = 0.0;
                break;
            }
        }

        self.tick_count += steps as u64;
        steps
    }

    /// Elapsed fraction of the next tick, in `[0, 1)`
    pub fn fractional(&self) -> f32 {
        (self.accumulated / self.timestep).clamp(0.0, 1.0) as f32
    }

    /// Drop any accumulated time
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new()
    }
}
