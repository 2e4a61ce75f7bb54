use crate::config::VsyncMode;

use super::{FrameTimer, TimeSource};

/// Outcome of [`FramePacer::begin_frame`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PaceReport {
    /// Nanoseconds slept to honor the cap; 0 when no throttling happened.
    pub slept_ns: i64,
    /// Frame delta after any re-measurement.
    pub delta_ns: i64,
}

/// Applies the frame-rate cap around a [`FrameTimer`].
///
/// Protocol per frame:
/// 1. `update(now, true)` anchors the new frame and measures the delta
/// 2. if capped and the delta is short, sleep the remainder
/// 3. `update(now', false)` re-measures against the same anchor
///
/// Step 3 is what keeps oversleep from accumulating: the next frame is
/// anchored at the post-sleep reading.
#[derive(Debug, Copy, Clone)]
pub struct FramePacer {
    vsync: VsyncMode,
}

impl FramePacer {
    pub fn new(vsync: VsyncMode) -> Self {
        Self { vsync }
    }

    #[inline]
    pub fn vsync(&self) -> VsyncMode {
        self.vsync
    }

    /// Manual throttling only runs when the swap chain does not already pace us.
    #[inline]
    pub fn throttling_enabled(&self) -> bool {
        self.vsync == VsyncMode::Off
    }

    /// Starts a frame: records a reading and sleeps off any time left under the cap.
    pub fn begin_frame<S>(&self, timer: &mut FrameTimer, source: &S) -> PaceReport
    where
        S: TimeSource + ?Sized,
    {
        timer.update(source.now_ns(), true);

        let mut slept_ns = 0;
        if self.throttling_enabled() {
            let remaining = timer.remaining_interval_ns();
            if remaining > 0 {
                log::trace!(
                    "frame {} ahead of cap by {remaining} ns; sleeping",
                    timer.frame_count()
                );
                source.sleep_ns(remaining);
                timer.update(source.now_ns(), false);
                slept_ns = remaining;
            }
        }

        PaceReport {
            slept_ns,
            delta_ns: timer.delta_ns(),
        }
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(VsyncMode::Off)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;

    use super::*;

    /// Clock that only moves when told to, or when slept on.
    #[derive(Debug, Default)]
    pub(crate) struct ManualClock {
        now: Cell<i64>,
        pub(crate) sleeps: Cell<u32>,
        oversleep_ns: Cell<i64>,
    }

    impl ManualClock {
        pub(crate) fn advance(&self, ns: i64) {
            self.now.set(self.now.get() + ns);
        }

        pub(crate) fn set_oversleep(&self, ns: i64) {
            self.oversleep_ns.set(ns);
        }
    }

    impl TimeSource for ManualClock {
        fn now_ns(&self) -> i64 {
            self.now.get()
        }

        fn sleep_ns(&self, ns: i64) {
            self.sleeps.set(self.sleeps.get() + 1);
            self.advance(ns + self.oversleep_ns.get());
        }
    }

    fn capped(fps: i64) -> FrameTimer {
        let mut t = FrameTimer::new();
        t.set_fps_cap(fps);
        t
    }

    #[test]
    fn short_frame_sleeps_the_remainder() {
        let clock = ManualClock::default();
        let mut timer = capped(100); // 10 ms
        let pacer = FramePacer::default();

        clock.advance(10_000_000);
        pacer.begin_frame(&mut timer, &clock);

        clock.advance(4_000_000);
        let report = pacer.begin_frame(&mut timer, &clock);

        assert_eq!(report.slept_ns, 6_000_000);
        assert_eq!(report.delta_ns, 10_000_000);
        assert_eq!(timer.frame_count(), 2);
    }

    #[test]
    fn remeasure_captures_oversleep() {
        let clock = ManualClock::default();
        clock.set_oversleep(300_000);
        let mut timer = capped(100);
        let pacer = FramePacer::default();

        pacer.begin_frame(&mut timer, &clock);
        clock.advance(1_000_000);
        let report = pacer.begin_frame(&mut timer, &clock);

        assert_eq!(report.delta_ns, 10_300_000);
        assert_eq!(timer.total_time_ns(), clock.now_ns());
    }

    #[test]
    fn long_frame_does_not_sleep() {
        let clock = ManualClock::default();
        let mut timer = capped(100);
        let pacer = FramePacer::default();

        pacer.begin_frame(&mut timer, &clock);
        clock.advance(25_000_000);
        let report = pacer.begin_frame(&mut timer, &clock);

        assert_eq!(report.slept_ns, 0);
        assert_eq!(clock.sleeps.get(), 1); // only the very first frame was early
    }

    #[test]
    fn uncapped_never_sleeps() {
        let clock = ManualClock::default();
        let mut timer = FrameTimer::new();
        let pacer = FramePacer::default();

        for _ in 0..3 {
            clock.advance(1);
            pacer.begin_frame(&mut timer, &clock);
        }
        assert_eq!(clock.sleeps.get(), 0);
        assert_eq!(timer.frame_count(), 3);
    }

    #[test]
    fn vsync_disables_manual_throttle() {
        let clock = ManualClock::default();
        let mut timer = capped(100);

        let pacer = FramePacer::new(VsyncMode::On);
        pacer.begin_frame(&mut timer, &clock);
        assert_eq!(clock.sleeps.get(), 0);

        let pacer = FramePacer::new(VsyncMode::Adaptive);
        pacer.begin_frame(&mut timer, &clock);
        assert_eq!(clock.sleeps.get(), 0);

        let pacer = FramePacer::new(VsyncMode::Off);
        pacer.begin_frame(&mut timer, &clock);
        assert_eq!(clock.sleeps.get(), 1);
    }
}
