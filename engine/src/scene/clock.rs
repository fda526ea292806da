//! Fixed Timestep Clock
//!
//! Converts variable frame times into a whole number of fixed simulation ticks.
//! Leftover time carries over to the next frame. When a frame falls too far
//! behind, the backlog beyond `max_ticks_per_frame` is dropped instead of
//! spiralling.

/// Accumulator for fixed-rate ticking.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedTimestep {
    step: f32,
    max_ticks_per_frame: u32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(step: f32, max_ticks_per_frame: u32) -> Self {
        Self {
            step,
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            accumulator: 0.0,
        }
    }

    /// Tick length in seconds.
    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn max_ticks_per_frame(&self) -> u32 {
        self.max_ticks_per_frame
    }

    /// Time accumulated but not yet ticked.
    pub fn pending(&self) -> f32 {
        self.accumulator
    }

    /// Fraction of a tick accumulated, for render interpolation (0..1).
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step).clamp(0.0, 1.0)
    }

    /// Add a frame's elapsed time and return how many ticks to run now.
    ///
    /// Negative and non-finite frame times are ignored.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if !(frame_dt > 0.0) || !frame_dt.is_finite() {
            return 0;
        }

        self.accumulator += frame_dt;
        let available = (self.accumulator / self.step).floor();
        if available >= self.max_ticks_per_frame as f32 {
            let dropped = self.accumulator - self.max_ticks_per_frame as f32 * self.step;
            log::debug!("fixed timestep fell behind, dropping {dropped:.3}s of backlog");
            self.accumulator = 0.0;
            return self.max_ticks_per_frame;
        }

        let ticks = available as u32;
        self.accumulator -= ticks as f32 * self.step;
        // Guard against drift leaving a tiny negative remainder
        self.accumulator = self.accumulator.max(0.0);
        ticks
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
