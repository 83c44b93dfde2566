//! Time management utilities

use std::time::Instant;

/// High-precision clock for frame timing
///
/// The frame driver ticks this once per frame and feeds the resulting
/// delta into the animation subsystem.
pub struct FrameClock {
    last_frame: Instant,
    total_time: f32,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance the clock by one frame and return the delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += delta;
        self.last_frame = now;
        self.frame_count += 1;
        delta
    }

    /// Get the average FPS since clock creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
