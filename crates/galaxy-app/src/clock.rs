//! Frame clock: elapsed time since start and per-frame delta.
//!
//! The galaxy animation is a pure function of elapsed time, so there is no
//! fixed-step accumulator. Long frames are logged but never clamped: elapsed
//! time always tracks the wall clock.

use std::time::{Duration, Instant};

use tracing::debug;

/// Frames longer than this are logged (250 ms, 4 FPS).
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(250);

/// Timing for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    /// Seconds since the clock started.
    pub elapsed: f64,
    /// Seconds since the previous tick (zero on the first).
    pub delta: f64,
    /// Index of this frame, starting at 0.
    pub frame: u64,
}

/// Monotonic clock started at construction.
pub struct FrameClock {
    start: Instant,
    previous: Option<Instant>,
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            previous: None,
            frame_count: 0,
        }
    }

    /// Advance to now.
    pub fn tick(&mut self) -> FrameTiming {
        self.tick_at(Instant::now())
    }

    /// Advance to `now`. Instants before the start or the previous tick count
    /// as zero elapsed time.
    pub fn tick_at(&mut self, now: Instant) -> FrameTiming {
        let delta = self
            .previous
            .map(|prev| now.saturating_duration_since(prev))
            .unwrap_or(Duration::ZERO);
        if delta > MAX_FRAME_TIME {
            debug!(
                "Long frame: {:.1}ms (limit {:.1}ms)",
                delta.as_secs_f64() * 1000.0,
                MAX_FRAME_TIME.as_secs_f64() * 1000.0
            );
        }

        let timing = FrameTiming {
            elapsed: now.saturating_duration_since(self.start).as_secs_f64(),
            delta: delta.as_secs_f64(),
            frame: self.frame_count,
        };
        self.previous = Some(now);
        self.frame_count += 1;
        timing
    }

    /// Frames ticked so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Seconds since the clock started, without ticking.
    pub fn uptime(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
