use super::pack::{pack_rgba32_f32, unpack_rgba32};

/// Straight-alpha RGBA color with normalized `f32` channels.
///
/// Used for surface clears and anywhere a color is configured rather than
/// stored per vertex. Per-vertex colors use the packed RGBA32 form instead.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from 8-bit channels (`0`–`255`).
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    /// Creates a color from a packed RGBA32 value.
    #[inline]
    pub fn from_rgba32(packed: u32) -> Self {
        let [r, g, b, a] = unpack_rgba32(packed);
        Self::from_u8(r, g, b, a)
    }

    /// Packs into RGBA32, clamping and rounding each channel.
    #[inline]
    pub fn to_rgba32(self) -> u32 {
        pack_rgba32_f32(self.r, self.g, self.b, self.a)
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}
