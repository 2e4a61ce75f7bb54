//! Ember engine crate.
//!
//! A small real-time mesh renderer: packed-color vertices, frame timing with a
//! rate cap, a GPU backend seam with a wgpu implementation, and a renderer with
//! verified uploads and a sticky error state.

pub mod config;
pub mod core;
pub mod device;
pub mod gfx;
pub mod logging;
pub mod mesh;
pub mod paint;
pub mod render;
pub mod scene;
pub mod shader;
pub mod time;
pub mod window;

pub use config::{EngineConfig, VsyncMode};
