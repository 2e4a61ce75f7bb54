use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::paint::{pack_rgba32, pack_rgba32_f32, OPAQUE_WHITE};

/// A single renderable point, laid out exactly as it is uploaded.
///
/// Layout (stride 24 bytes):
/// - `position`: 3 × f32 at offset 0
/// - `color`: packed RGBA32 at offset 12, consumed as an unnormalized integer
/// - `uv`: 2 × f32 at offset 16
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub color: u32,
    pub uv: Vec2,
}

impl Vertex {
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;
    pub const POSITION_OFFSET: u64 = std::mem::offset_of!(Vertex, position) as u64;
    pub const COLOR_OFFSET: u64 = std::mem::offset_of!(Vertex, color) as u64;
    pub const UV_OFFSET: u64 = std::mem::offset_of!(Vertex, uv) as u64;

    /// Opaque white vertex at `position`; uv is the projected `(x, y)`.
    #[inline]
    pub fn new(position: Vec3) -> Self {
        Self::with_color(position, OPAQUE_WHITE)
    }

    /// Vertex with a packed RGBA32 color; uv is the projected `(x, y)`.
    #[inline]
    pub fn with_color(position: Vec3, color: u32) -> Self {
        Self::with_color_uv(position, color, position.truncate())
    }

    /// Vertex with a normalized RGB color (alpha 1.0); uv is the projected `(x, y)`.
    #[inline]
    pub fn with_rgb(position: Vec3, rgb: Vec3) -> Self {
        Self::with_rgb_uv(position, rgb, position.truncate())
    }

    #[inline]
    pub fn with_color_uv(position: Vec3, color: u32, uv: Vec2) -> Self {
        Self { position, color, uv }
    }

    #[inline]
    pub fn with_rgb_uv(position: Vec3, rgb: Vec3, uv: Vec2) -> Self {
        Self::with_color_uv(position, pack_rgba32_f32(rgb.x, rgb.y, rgb.z, 1.0), uv)
    }

    /// Re-packs the color from 8-bit channels clamped to `[0, 255]`, fully opaque.
    #[inline]
    pub fn set_color(&mut self, r: i32, g: i32, b: i32) {
        self.color = pack_rgba32(r, g, b, 255);
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::with_color_uv(Vec3::ZERO, OPAQUE_WHITE, Vec2::ZERO)
    }
}
