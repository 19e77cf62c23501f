use std::sync::LazyLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct TimeStamp(Instant);

impl TimeStamp {
    /// Get a new timestamp for "now"
    pub fn now() -> Self {
        TimeStamp(Instant::now())
    }

    /// Get elapsed milliseconds since this timestamp
    pub fn elapsed_ms(&self) -> f64 {
        self.0.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the elapsed [`Duration`] since the timestamp.
    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

pub static EPOCH: LazyLock<TimeStamp> = LazyLock::new(TimeStamp::now);

/// Wall-clock limit for (a phase of) a solve, measured from the start of the solve.
/// Only checked between placement attempts, never preemptively.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: TimeStamp,
    limit_ms: f64,
}

impl Deadline {
    pub fn new(start: TimeStamp, limit_ms: f64) -> Self {
        Deadline { start, limit_ms }
    }

    /// A deadline that never expires
    pub fn none() -> Self {
        Deadline::new(TimeStamp::now(), f64::INFINITY)
    }

    pub fn is_expired(&self) -> bool {
        self.start.elapsed_ms() >= self.limit_ms
    }
}
