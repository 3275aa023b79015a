//! Wall-Clock Timing
//!
//! Measures the full lifetime of a spawned process, from spawn to reap.
//! Cycle counters are meaningless across a process boundary, so only
//! monotonic wall-clock time is recorded.

use std::time::{Duration, Instant};

/// Timer for measuring one process run
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    #[inline(always)]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time since `start`
    #[inline(always)]
    pub fn stop(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Time a closure, returning its result alongside the elapsed wall-clock time
pub fn time<T, F>(f: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let timer = Timer::start();
    let value = f();
    (value, timer.stop())
}
