//! Frame timing utilities

use std::time::{Duration, Instant};

/// Tracks wall-clock frame timing for a host loop
pub struct FrameTimer {
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
}

impl FrameTimer {
    /// Create a new frame timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Call once per frame to update timing
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get delta time in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get delta time as Duration
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts variable frame deltas into a whole number of fixed engine ticks.
///
/// Leftover time is carried to the next frame. `max_steps` bounds the number of
/// ticks a single long frame may produce; any excess beyond that is dropped so a
/// stalled host does not spiral.
#[derive(Clone, Debug)]
pub struct FixedTimestep {
    step: f32,
    max_steps: u32,
    accumulator: f32,
    total_steps: u64,
}

impl FixedTimestep {
    /// Create a fixed timestep with the given step length in seconds.
    pub fn new(step: f32) -> Self {
        Self {
            step: step.max(f32::EPSILON),
            max_steps: 8,
            accumulator: 0.0,
            total_steps: 0,
        }
    }

    /// Override the per-frame tick clamp.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Step length in seconds.
    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Feed one frame's delta; returns how many ticks to run this frame.
    pub fn accumulate(&mut self, delta_secs: f32) -> u32 {
        self.accumulator += delta_secs.max(0.0);

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == self.max_steps && self.accumulator >= self.step {
            log::debug!(
                "FixedTimestep dropping {:.4}s after {} steps",
                self.accumulator, steps
            );
            self.accumulator %= self.step;
        }

        self.total_steps += steps as u64;
        steps
    }

    /// Fraction of a step currently left in the accumulator (0.0-1.0).
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    /// Total ticks produced since creation.
    #[inline]
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
