//! Packed integer color formats.
//!
//! 32-bit colors use little-endian RGBA byte order: `u32::to_le_bytes` yields
//! `[r, g, b, a]`, matching an RGBA8 pixel surface. Vertex colors are uploaded
//! in this format unchanged.
//!
//! 24-bit colors (no alpha) pack as `0x00RRGGBB`.

/// Opaque white in RGBA32.
pub const OPAQUE_WHITE: u32 = 0xFFFF_FFFF;

/// Packs 8-bit channels into RGBA32. Each channel is clamped to `[0, 255]`.
#[inline]
pub fn pack_rgba32(r: i32, g: i32, b: i32, a: i32) -> u32 {
    let r = clamp_u8(r);
    let g = clamp_u8(g);
    let b = clamp_u8(b);
    let a = clamp_u8(a);
    (a << 24) | (b << 16) | (g << 8) | r
}

/// Packs normalized channels into RGBA32.
///
/// Each channel is clamped to `[0.0, 1.0]` and scaled to `[0, 255]`, rounding
/// half away from zero (`0.5 * 255 = 127.5` becomes `128`).
#[inline]
pub fn pack_rgba32_f32(r: f32, g: f32, b: f32, a: f32) -> u32 {
    pack_rgba32(unorm_to_i32(r), unorm_to_i32(g), unorm_to_i32(b), unorm_to_i32(a))
}

/// Packs 8-bit channels into RGB24 (`0x00RRGGBB`). Clamped like [`pack_rgba32`].
#[inline]
pub fn pack_rgb24(r: i32, g: i32, b: i32) -> u32 {
    (clamp_u8(r) << 16) | (clamp_u8(g) << 8) | clamp_u8(b)
}

/// Packs normalized channels into RGB24. Clamped and rounded like
/// [`pack_rgba32_f32`].
#[inline]
pub fn pack_rgb24_f32(r: f32, g: f32, b: f32) -> u32 {
    pack_rgb24(unorm_to_i32(r), unorm_to_i32(g), unorm_to_i32(b))
}

/// Splits an RGBA32 value into `[r, g, b, a]`.
#[inline]
pub fn unpack_rgba32(packed: u32) -> [u8; 4] {
    packed.to_le_bytes()
}

/// Splits an RGB24 value into `[r, g, b]`. The top byte is ignored.
#[inline]
pub fn unpack_rgb24(packed: u32) -> [u8; 3] {
    [
        ((packed >> 16) & 0xFF) as u8,
        ((packed >> 8) & 0xFF) as u8,
        (packed & 0xFF) as u8,
    ]
}

#[inline]
fn clamp_u8(v: i32) -> u32 {
    v.clamp(0, 255) as u32
}

#[inline]
fn unorm_to_i32(v: f32) -> i32 {
    // NaN clamps to NaN; treat it as zero rather than letting `as` decide.
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as i32
}
