//! Frame timing.
//!
//! ```ignore
//! use snowfield::time::Clock;
//!
//! let mut clock = Clock::new();
//!
//! // In the redraw handler:
//! let (elapsed, delta) = clock.tick();
//! ```

use std::time::Instant;

/// Monotonic elapsed time and per-frame delta.
#[derive(Debug)]
pub struct Clock {
    /// When the clock was created.
    start: Instant,
    /// Total elapsed time in seconds at the last tick.
    elapsed_secs: f32,
    /// Time between the last two ticks in seconds.
    delta_secs: f32,
    /// Total ticks since start.
    frame_count: u64,
}

impl Clock {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
        }
    }

    /// Sample wall time. Call once per frame.
    ///
    /// Returns `(elapsed_time, delta_time)` for convenience.
    pub fn tick(&mut self) -> (f32, f32) {
        let elapsed = self.start.elapsed().as_secs_f32();
        self.advance_to(elapsed)
    }

    /// Move the clock to an explicit elapsed time.
    ///
    /// Times earlier than the current one are ignored so elapsed time never
    /// runs backwards; the delta is zero in that case.
    pub fn advance_to(&mut self, elapsed: f32) -> (f32, f32) {
        let elapsed = elapsed.max(self.elapsed_secs);
        self.delta_secs = elapsed - self.elapsed_secs;
        self.elapsed_secs = elapsed;
        self.frame_count += 1;
        (self.elapsed_secs, self.delta_secs)
    }

    /// Total elapsed time in seconds at the last tick.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Time since the previous tick in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total ticks since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
