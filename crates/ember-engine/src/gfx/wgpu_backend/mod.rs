//! wgpu implementation of the backend seam.

mod backend;
mod pipeline;
pub(crate) mod reflect;

pub use backend::WgpuBackend;
pub use reflect::ShaderError;
