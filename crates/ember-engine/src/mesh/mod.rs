//! CPU-side mesh data.
//!
//! A `Mesh` is produced by a scene and only read by the renderer while it is
//! being uploaded; the renderer keeps the GPU copy, never the `Mesh`.

mod mesh;
mod vertex;

pub use mesh::{Mesh, MeshError};
pub use vertex::Vertex;
