//! Shader program loading and the built-in mesh shaders.

mod loader;

pub use loader::{ShaderLoadError, ShaderLoader, DEFAULT_FRAGMENT_SOURCE, DEFAULT_VERTEX_SOURCE};
