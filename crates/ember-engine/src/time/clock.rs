use std::time::{Duration, Instant};

/// Monotonic nanosecond clock plus the blocking delay used for pacing.
///
/// The frame timer only consumes readings; implementations decide where they
/// come from. Tests substitute a manual clock whose sleep advances time.
pub trait TimeSource {
    /// Monotonic reading in nanoseconds. Must never decrease.
    fn now_ns(&self) -> i64;

    /// Blocks the calling thread for `ns` nanoseconds. Non-positive values return
    /// immediately.
    fn sleep_ns(&self, ns: i64);
}

/// `Instant`-backed clock measured from its own creation.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
    spin_threshold: Duration,
}

impl MonotonicClock {
    /// Creates a clock with a 1 ms spin threshold.
    ///
    /// OS sleeps overshoot by up to a scheduler quantum, so the final stretch of
    /// every sleep is spent spinning.
    pub fn new() -> Self {
        Self::with_spin_threshold(Duration::from_millis(1))
    }

    pub fn with_spin_threshold(spin_threshold: Duration) -> Self {
        Self {
            origin: Instant::now(),
            spin_threshold,
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now_ns(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }

    fn sleep_ns(&self, ns: i64) {
        if ns <= 0 {
            return;
        }
        precise_sleep(Duration::from_nanos(ns as u64), self.spin_threshold);
    }
}

/// Sleeps for `duration`, spinning for the last `spin_threshold` of it.
pub fn precise_sleep(duration: Duration, spin_threshold: Duration) {
    let deadline = Instant::now() + duration;

    if let Some(coarse) = duration.checked_sub(spin_threshold) {
        if !coarse.is_zero() {
            std::thread::sleep(coarse);
        }
    }

    while Instant::now() < deadline {
        std::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_are_monotonic() {
        let clock = MonotonicClock::new();
        let a = clock.now_ns();
        let b = clock.now_ns();
        assert!(b >= a);
    }

    #[test]
    fn sleep_waits_at_least_the_requested_time() {
        let clock = MonotonicClock::new();
        let before = clock.now_ns();
        clock.sleep_ns(2_000_000);
        assert!(clock.now_ns() - before >= 2_000_000);
    }

    #[test]
    fn non_positive_sleep_returns_immediately() {
        let clock = MonotonicClock::with_spin_threshold(Duration::ZERO);
        clock.sleep_ns(0);
        clock.sleep_ns(-5);
    }
}
