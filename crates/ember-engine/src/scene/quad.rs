use glam::{Vec2, Vec3};

use crate::mesh::{Mesh, Vertex};
use crate::time::FrameTimer;

use super::Scene;

/// Static textured quad spanning `[-0.5, 0.5]` on both axes.
pub struct QuadScene {
    meshes: Vec<Mesh>,
    dirty: bool,
}

impl QuadScene {
    pub fn new() -> Self {
        let vertices = vec![
            Vertex::with_rgb_uv(Vec3::new(-0.5, -0.5, 0.0), Vec3::X, Vec2::new(0.0, 1.0)),
            Vertex::with_rgb_uv(Vec3::new(0.5, -0.5, 0.0), Vec3::Y, Vec2::new(1.0, 1.0)),
            Vertex::with_rgb_uv(Vec3::new(-0.5, 0.5, 0.0), Vec3::ZERO, Vec2::new(0.0, 0.0)),
            Vertex::with_rgb_uv(Vec3::new(0.5, 0.5, 0.0), Vec3::Z, Vec2::new(1.0, 0.0)),
        ];
        Self {
            meshes: vec![Mesh::new(vertices, vec![0, 1, 2, 2, 1, 3])],
            dirty: true,
        }
    }
}

impl Default for QuadScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for QuadScene {
    fn update(&mut self, _timer: &FrameTimer) {}

    fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;

    #[test]
    fn quad_is_two_valid_triangles() {
        let scene = QuadScene::new();
        let mesh = &scene.meshes()[0];
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 1, 3]);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn dirty_once_then_static() {
        let mut scene = QuadScene::new();
        assert!(scene.take_dirty());

        let mut timer = FrameTimer::new();
        timer.update(1_000_000_000, true);
        scene.update(&timer);

        assert!(!scene.take_dirty());
        assert_eq!(scene.local_transform(), Mat4::IDENTITY);
    }
}
