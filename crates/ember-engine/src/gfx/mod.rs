//! GPU backend seam.
//!
//! The renderer talks to the GPU only through [`GpuBackend`]: opaque handles,
//! name-based attribute/uniform lookup, whole-buffer uploads and indexed draws.
//! `WgpuBackend` is the real implementation; tests use a recording mock.

mod backend;
mod types;
pub mod wgpu_backend;

#[cfg(test)]
pub(crate) mod mock;

pub use backend::GpuBackend;
pub use types::{
    AttributeFormat, BufferId, BufferTarget, DrawCall, LayoutId, ProgramId, TextureId,
    TextureImage, TextureLoadError, UniformLocation, UniformValue, VertexAttribute, TEXTURE_UNITS,
};
pub use wgpu_backend::{ShaderError, WgpuBackend};
