//! Time management utilities
//!
//! [`FrameClock`] turns raw frame durations into the two cadences the scene
//! consumes: a clamped, time-scaled variable delta for `update`, and a count
//! of fixed steps for `fixed_update` driven by an accumulator.

use std::time::Instant;

use crate::config::TimeConfig;

/// Smallest fixed timestep accepted by [`FrameClock::set_fixed_delta_time`]
pub const MIN_FIXED_DELTA_TIME: f32 = 0.001;

/// Read-only view of the frame timing the scene consumes
///
/// [`Scene::update_with`](crate::ecs::Scene::update_with) and
/// [`Scene::fixed_update_with`](crate::ecs::Scene::fixed_update_with) read
/// their deltas through it.
pub trait TimeSource {
    /// Variable frame delta in seconds (already clamped and scaled)
    fn delta_time(&self) -> f32;

    /// Fixed simulation step in seconds
    fn fixed_delta_time(&self) -> f32;
}

/// Result of advancing the clock by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStep {
    /// Clamped, scaled delta for the variable-rate update
    pub delta_time: f32,
    /// How many fixed updates to run this frame
    pub fixed_steps: u32,
    /// Fixed step length in seconds
    pub fixed_delta_time: f32,
}

/// Frame timer with clamping, time scaling and a fixed-step accumulator
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_frame: Instant,
    delta_time: f32,
    fixed_delta_time: f32,
    max_delta_time: f32,
    time_scale: f32,
    accumulator: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(&TimeConfig::default())
    }
}

impl FrameClock {
    /// Create a new clock from timing configuration
    pub fn new(config: &TimeConfig) -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            fixed_delta_time: config.fixed_delta_time.max(MIN_FIXED_DELTA_TIME),
            max_delta_time: config.max_delta_time.max(0.0),
            time_scale: config.time_scale.max(0.0),
            accumulator: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance by the wall-clock time elapsed since the previous tick
    pub fn tick(&mut self) -> FrameStep {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(raw)
    }

    /// Advance by an explicit raw frame duration in seconds
    ///
    /// The raw duration is clamped to `max_delta_time`, multiplied by the
    /// time scale, and added to the accumulator. A non-finite duration counts
    /// as zero. The number of fixed steps is
    /// `floor(accumulator / fixed_delta_time)`; the remainder carries over.
    pub fn advance(&mut self, raw_delta: f32) -> FrameStep {
        let raw_delta = if raw_delta.is_finite() { raw_delta } else { 0.0 };
        let clamped = raw_delta.clamp(0.0, self.max_delta_time);
        self.delta_time = clamped * self.time_scale;
        self.total_time += self.delta_time;
        self.frame_count += 1;

        self.accumulator += self.delta_time;
        let mut fixed_steps = 0;
        while self.accumulator >= self.fixed_delta_time {
            self.accumulator -= self.fixed_delta_time;
            fixed_steps += 1;
        }

        FrameStep {
            delta_time: self.delta_time,
            fixed_steps,
            fixed_delta_time: self.fixed_delta_time,
        }
    }

    /// Set the time scale (negative values clamp to zero)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Get the time scale
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set the fixed timestep (clamped to [`MIN_FIXED_DELTA_TIME`])
    pub fn set_fixed_delta_time(&mut self, fixed_delta_time: f32) {
        self.fixed_delta_time = fixed_delta_time.max(MIN_FIXED_DELTA_TIME);
    }

    /// Set the largest raw frame duration honoured per frame
    pub fn set_max_delta_time(&mut self, max_delta_time: f32) {
        self.max_delta_time = max_delta_time.max(0.0);
    }

    /// Time left in the accumulator after the last frame
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Get the total scaled time since clock creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the current FPS (based on last frame time)
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }
}

impl TimeSource for FrameClock {
    fn delta_time(&self) -> f32 {
        self.delta_time
    }

    fn fixed_delta_time(&self) -> f32 {
        self.fixed_delta_time
    }
}
