//! Frame clock service.

use std::time::Instant;

/// Source of per-frame delta time.
pub trait TimeSource {
    /// Measure the time since the previous call. Called once per frame.
    fn recalculate(&mut self);

    /// Seconds between the last two `recalculate` calls.
    fn delta_time(&self) -> f32;
}

/// Advances by the same step every frame. Deterministic.
#[derive(Debug, Clone)]
pub struct FixedClock {
    dt: f32,
    ticks: u64,
}

impl FixedClock {
    pub fn new(dt: f32) -> Self {
        Self { dt, ticks: 0 }
    }

    /// Simulated seconds so far, computed from the tick count to avoid drift.
    pub fn elapsed(&self) -> f64 {
        self.ticks as f64 * self.dt as f64
    }
}

impl Default for FixedClock {
    /// 60 Hz.
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl TimeSource for FixedClock {
    fn recalculate(&mut self) {
        self.ticks += 1;
    }

    fn delta_time(&self) -> f32 {
        self.dt
    }
}

/// Wall-clock time between frames, clamped to `max_delta`.
///
/// The first frame reports zero.
#[derive(Debug, Clone)]
pub struct SystemClock {
    last: Option<Instant>,
    delta: f32,
    max_delta: f32,
}

impl SystemClock {
    pub fn new(max_delta: f32) -> Self {
        Self {
            last: None,
            delta: 0.0,
            max_delta,
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(0.25)
    }
}

impl TimeSource for SystemClock {
    fn recalculate(&mut self) {
        let now = Instant::now();
        self.delta = match self.last {
            Some(last) => now.duration_since(last).as_secs_f32().min(self.max_delta),
            None => 0.0,
        };
        self.last = Some(now);
    }

    fn delta_time(&self) -> f32 {
        self.delta
    }
}
