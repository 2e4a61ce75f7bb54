//! Color model shared between configuration, meshes and renderers.
//!
//! Scope:
//! - packed integer formats used in vertex data (`pack`)
//! - normalized straight-alpha colors used for clears (`Color`)

pub mod color;
pub mod pack;

pub use color::Color;
pub use pack::{
    pack_rgb24, pack_rgb24_f32, pack_rgba32, pack_rgba32_f32, unpack_rgb24, unpack_rgba32,
    OPAQUE_WHITE,
};
