//! Mesh producers.
//!
//! A [`Scene`] owns its meshes and a local transform; the frame loop asks it to
//! advance, uploads its mesh when it reports a change, and feeds the transform
//! to the renderer as a uniform.

mod quad;
mod triangle;

use glam::Mat4;

use crate::mesh::Mesh;
use crate::time::FrameTimer;

pub use quad::QuadScene;
pub use triangle::TriangleScene;

pub trait Scene {
    /// Advances the scene to the timer's current time.
    fn update(&mut self, timer: &FrameTimer);

    fn meshes(&self) -> &[Mesh];

    /// Object-to-clip transform for the current state.
    fn local_transform(&mut self) -> Mat4 {
        Mat4::IDENTITY
    }

    /// Returns `true` once after the mesh data changed, including the first
    /// call.
    fn take_dirty(&mut self) -> bool;
}
