//! GPU device + surface management.
//!
//! `Gpu` owns the adapter, device, queue and window surface. The surface
//! present mode follows the configured vsync setting.

mod gpu;
mod surface;

pub use gpu::{Gpu, GpuFrame, GpuInit};
pub use surface::SurfaceErrorAction;
