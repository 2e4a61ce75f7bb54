//! Engine-facing contracts and the frame loop.
//!
//! - `App`/`FrameCtx`: the interface between the window runtime and user code
//! - `AppContext`: owns timer, scene and renderer; `tick` runs one frame

mod context;
mod ctx;

pub use context::{AppContext, TickReport};
pub use ctx::{App, AppControl, FrameCtx};
