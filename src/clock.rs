//! Time sources read once at the top of each frame.

use std::time::Instant;

/// Yields elapsed seconds since the source started. Must never run backwards.
pub trait TimeSource {
    fn elapsed(&mut self) -> f64;
}

/// Wall-clock time since construction.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    start_time: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeSource for FrameClock {
    fn elapsed(&mut self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

/// Deterministic clock for headless runs: each read advances by one step.
///
/// The first read returns `0.0`.
#[derive(Clone, Copy, Debug)]
pub struct FixedStepClock {
    step: f64,
    frame: u64,
}

impl FixedStepClock {
    pub fn new(step: f64) -> Self {
        Self { step, frame: 0 }
    }

    /// Clock ticking `fps` times per simulated second.
    pub fn from_fps(fps: f64) -> Self {
        Self::new(1.0 / fps)
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

impl TimeSource for FixedStepClock {
    fn elapsed(&mut self) -> f64 {
        // Multiply instead of accumulate so long runs don't drift.
        let t = self.frame as f64 * self.step;
        self.frame += 1;
        t
    }
}
