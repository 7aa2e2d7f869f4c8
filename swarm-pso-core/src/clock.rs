//! Wall-clock seam for the time cap and time-decayed inertia.

use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;

/// Source of the current time in Unix milliseconds
pub trait Clock {
    fn now_millis(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

/// Clock backed by [`std::time::SystemTime`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Manually advanced clock for deterministic runs
///
/// Time only moves when [`ManualClock::advance`] is called, so it can be
/// shared with an objective that simulates expensive evaluations.
#[derive(Debug, Default)]
pub struct ManualClock {
    current_time_ms: AtomicU64,
}

impl ManualClock {
    /// Create a clock stopped at `start_ms`
    pub fn new(start_ms: u64) -> Self {
        Self {
            current_time_ms: AtomicU64::new(start_ms),
        }
    }

    /// Advance the clock
    pub fn advance(&self, duration: Duration) {
        self.current_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.current_time_ms.load(Ordering::SeqCst)
    }
}
