/// Nanoseconds in one second.
pub const ONE_SECOND_NS: i64 = 1_000_000_000;

/// Frame timing state fed by an external monotonic clock.
///
/// The timer never reads a clock itself. Callers pass absolute readings to
/// [`update`](Self::update); a reading flagged as a new frame moves the frame
/// anchor, while intermediate readings (taken after a pacing sleep) only
/// re-measure the delta against the current anchor.
#[derive(Debug, Clone, Default)]
pub struct FrameTimer {
    min_frame_interval_ns: i64,
    last_tick_ns: i64,
    now_tick_ns: i64,
    delta_ns: i64,
    frame_count: i64,
    total_time_ns: i64,
}

impl FrameTimer {
    /// Creates an uncapped timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target maximum frame rate. `fps <= 0` means uncapped.
    ///
    /// The interval is `1e9 / fps` with integer truncation.
    pub fn set_fps_cap(&mut self, fps: i64) {
        self.min_frame_interval_ns = if fps <= 0 { 0 } else { ONE_SECOND_NS / fps };
    }

    /// Frame rate implied by the current interval; 0 when uncapped.
    pub fn fps_cap(&self) -> i64 {
        if self.min_frame_interval_ns == 0 {
            0
        } else {
            ONE_SECOND_NS / self.min_frame_interval_ns
        }
    }

    /// Records a clock reading.
    ///
    /// `now_ns` is an absolute monotonic reading, not a delta. When `new_frame`
    /// is set the previous reading becomes the frame anchor and the frame count
    /// advances.
    pub fn update(&mut self, now_ns: i64, new_frame: bool) {
        if new_frame {
            self.last_tick_ns = self.now_tick_ns;
            self.frame_count += 1;
        }
        self.now_tick_ns = now_ns;
        self.delta_ns = self.now_tick_ns.saturating_sub(self.last_tick_ns);
        self.total_time_ns = now_ns;
    }

    #[inline]
    pub fn frame_count(&self) -> i64 {
        self.frame_count
    }

    /// Minimum time between frames, in nanoseconds. 0 when uncapped.
    #[inline]
    pub fn min_frame_interval_ns(&self) -> i64 {
        self.min_frame_interval_ns
    }

    /// Time between the frame anchor and the latest reading.
    #[inline]
    pub fn delta_ns(&self) -> i64 {
        self.delta_ns
    }

    /// Latest absolute reading.
    #[inline]
    pub fn total_time_ns(&self) -> i64 {
        self.total_time_ns
    }

    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        ns_to_seconds_f32(self.delta_ns)
    }

    #[inline]
    pub fn total_seconds(&self) -> f32 {
        ns_to_seconds_f32(self.total_time_ns)
    }

    /// Remaining time before the cap allows the next frame; 0 when uncapped or
    /// already late.
    #[inline]
    pub fn remaining_interval_ns(&self) -> i64 {
        if self.min_frame_interval_ns > 0 && self.delta_ns < self.min_frame_interval_ns {
            self.min_frame_interval_ns - self.delta_ns
        } else {
            0
        }
    }
}

#[inline]
pub fn ns_to_seconds_f32(ns: i64) -> f32 {
    ns_to_seconds_f64(ns) as f32
}

#[inline]
pub fn ns_to_seconds_f64(ns: i64) -> f64 {
    ns as f64 / ONE_SECOND_NS as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── fps cap ───────────────────────────────────────────────────────────

    #[test]
    fn fps_cap_truncates_interval() {
        let mut t = FrameTimer::new();
        for fps in [1, 3, 7, 60, 144, 400, 1_000_000_001] {
            t.set_fps_cap(fps);
            assert_eq!(t.min_frame_interval_ns(), ONE_SECOND_NS / fps);
        }
        t.set_fps_cap(3);
        assert_eq!(t.min_frame_interval_ns(), 333_333_333);
    }

    #[test]
    fn non_positive_fps_is_uncapped() {
        let mut t = FrameTimer::new();
        t.set_fps_cap(60);
        for fps in [0, -1, i64::MIN] {
            t.set_fps_cap(fps);
            assert_eq!(t.min_frame_interval_ns(), 0);
            assert_eq!(t.fps_cap(), 0);
        }
    }

    #[test]
    fn fps_cap_round_trips_even_divisors() {
        let mut t = FrameTimer::new();
        t.set_fps_cap(400);
        assert_eq!(t.min_frame_interval_ns(), 2_500_000);
        assert_eq!(t.fps_cap(), 400);
    }

    #[test]
    fn starts_uncapped() {
        assert_eq!(FrameTimer::new().min_frame_interval_ns(), 0);
    }

    // ── update ────────────────────────────────────────────────────────────

    #[test]
    fn new_frames_count_once_and_measure_delta() {
        let mut t = FrameTimer::new();
        t.update(1_000, true);
        assert_eq!(t.frame_count(), 1);
        t.update(1_750, true);
        assert_eq!(t.frame_count(), 2);
        assert_eq!(t.delta_ns(), 750);
        assert_eq!(t.total_time_ns(), 1_750);
    }

    #[test]
    fn sub_updates_keep_anchor_and_count() {
        let mut t = FrameTimer::new();
        t.update(10_000, true);
        t.update(10_400, true);
        assert_eq!(t.delta_ns(), 400);

        t.update(10_900, false);
        assert_eq!(t.frame_count(), 2);
        assert_eq!(t.delta_ns(), 900);
        assert_eq!(t.total_time_ns(), 10_900);

        // The next frame is anchored at the last sub-update reading.
        t.update(11_000, true);
        assert_eq!(t.delta_ns(), 100);
    }

    #[test]
    fn first_frame_delta_is_measured_from_zero() {
        let mut t = FrameTimer::new();
        t.update(5_000, true);
        assert_eq!(t.delta_ns(), 5_000);
    }

    #[test]
    fn total_time_tracks_input_not_accumulated_delta() {
        let mut t = FrameTimer::new();
        t.update(100, true);
        t.update(50, false);
        assert_eq!(t.total_time_ns(), 50);
    }

    #[test]
    fn remaining_interval_reflects_cap() {
        let mut t = FrameTimer::new();
        t.set_fps_cap(1_000); // 1 ms
        t.update(0, true);
        t.update(400_000, true);
        assert_eq!(t.remaining_interval_ns(), 600_000);
        t.update(1_200_000, false);
        assert_eq!(t.remaining_interval_ns(), 0);
    }

    // ── conversions ───────────────────────────────────────────────────────

    #[test]
    fn ns_conversions() {
        assert_eq!(ns_to_seconds_f64(1_500_000_000), 1.5);
        assert_eq!(ns_to_seconds_f32(250_000_000), 0.25);
        assert_eq!(ns_to_seconds_f64(0), 0.0);
    }

    #[test]
    fn seconds_views_follow_nanosecond_state() {
        let mut t = FrameTimer::new();
        t.update(500_000_000, true);
        t.update(750_000_000, true);
        assert_eq!(t.delta_seconds(), 0.25);
        assert_eq!(t.total_seconds(), 0.75);
    }
}
