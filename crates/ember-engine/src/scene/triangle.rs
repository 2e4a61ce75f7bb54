use std::f32::consts::PI;

use glam::{Mat4, Quat, Vec3};

use crate::mesh::{Mesh, Vertex};
use crate::time::FrameTimer;

use super::Scene;

/// RGB triangle that sways along x and spins about z.
///
/// At time `t` seconds: translation `x = sin(t) / 2`, rotation `t·π` radians.
pub struct TriangleScene {
    meshes: Vec<Mesh>,
    mesh_dirty: bool,

    translation: Vec3,
    rotation: Quat,
    scale: f32,

    transform: Mat4,
    transform_dirty: bool,
}

impl TriangleScene {
    pub fn new() -> Self {
        let vertices = vec![
            Vertex::with_rgb(Vec3::new(-0.5, -0.5, 0.0), Vec3::X),
            Vertex::with_rgb(Vec3::new(0.5, -0.5, 0.0), Vec3::Y),
            Vertex::with_rgb(Vec3::new(0.0, 0.5, 0.0), Vec3::Z),
        ];
        Self {
            meshes: vec![Mesh::new(vertices, vec![2, 0, 1])],
            mesh_dirty: true,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
            transform: Mat4::IDENTITY,
            transform_dirty: false,
        }
    }
}

impl Default for TriangleScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for TriangleScene {
    fn update(&mut self, timer: &FrameTimer) {
        let t = timer.total_seconds();
        self.translation.x = t.sin() / 2.0;
        self.rotation = Quat::from_rotation_z(t * PI);
        self.transform_dirty = true;
    }

    fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    fn local_transform(&mut self) -> Mat4 {
        if self.transform_dirty {
            self.transform = Mat4::from_scale_rotation_translation(
                Vec3::splat(self.scale),
                self.rotation,
                self.translation,
            );
            self.transform_dirty = false;
        }
        self.transform
    }

    fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.mesh_dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer_at(seconds: f64) -> FrameTimer {
        let mut timer = FrameTimer::new();
        timer.update((seconds * 1e9) as i64, true);
        timer
    }

    #[test]
    fn starts_at_identity() {
        let mut scene = TriangleScene::new();
        assert_eq!(scene.local_transform(), Mat4::IDENTITY);
        assert_eq!(scene.meshes()[0].indices, vec![2, 0, 1]);
    }

    #[test]
    fn half_second_pose() {
        let mut scene = TriangleScene::new();
        scene.update(&timer_at(0.5));

        let m = scene.local_transform();
        let origin = m.transform_point3(Vec3::ZERO);
        assert!((origin.x - 0.5f32.sin() / 2.0).abs() < 1e-5);

        // Quarter turn: +x maps onto +y.
        let x_axis = m.transform_vector3(Vec3::X);
        assert!((x_axis - Vec3::Y).length() < 1e-5, "{x_axis}");
    }

    #[test]
    fn transform_is_cached_until_next_update() {
        let mut scene = TriangleScene::new();
        scene.update(&timer_at(1.0));
        let first = scene.local_transform();
        assert!(!scene.transform_dirty);
        assert_eq!(scene.local_transform(), first);

        scene.update(&timer_at(2.0));
        assert_ne!(scene.local_transform(), first);
    }

    #[test]
    fn mesh_reported_dirty_once() {
        let mut scene = TriangleScene::new();
        assert!(scene.take_dirty());
        scene.update(&timer_at(1.0));
        assert!(!scene.take_dirty());
    }
}
