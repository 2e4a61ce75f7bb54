//! Time subsystem.
//!
//! - `FrameTimer`: delta/total time and frame counting from external readings
//! - `TimeSource`: where readings and pacing sleeps come from
//! - `FramePacer`: the cap-and-remeasure protocol run at the top of each frame

mod clock;
mod frame_timer;
mod pacer;

pub use clock::{precise_sleep, MonotonicClock, TimeSource};
pub use frame_timer::{ns_to_seconds_f32, ns_to_seconds_f64, FrameTimer, ONE_SECOND_NS};
pub use pacer::{FramePacer, PaceReport};

#[cfg(test)]
pub(crate) use pacer::tests::ManualClock;
