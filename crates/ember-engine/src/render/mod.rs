//! Mesh renderer.
//!
//! [`Renderer`] owns the GPU copy of one mesh and draws it with a borrowed
//! shader program through any [`GpuBackend`](crate::gfx::GpuBackend). GPU
//! handles live in move-only [`GpuResource`] wrappers released exactly once.

mod ctx;
mod error;
mod renderer;
mod resource;

pub use ctx::RenderTarget;
pub use error::{ErrorKind, RendererError};
pub use renderer::{FrameUniforms, Renderer};
pub use resource::{GpuHandle, GpuResource};
