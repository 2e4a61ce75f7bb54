use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::gfx::{GpuBackend, ProgramId};

/// Built-in vertex stage: `pos`/`rgb`/`uv` inputs, `transform` uniform.
pub const DEFAULT_VERTEX_SOURCE: &str = include_str!("shaders/mesh.vert.wgsl");

/// Built-in fragment stage: texture unit 0 tinted by vertex color, scrolled by
/// the `offset` uniform.
pub const DEFAULT_FRAGMENT_SOURCE: &str = include_str!("shaders/mesh.frag.wgsl");

#[derive(Debug, Error)]
pub enum ShaderLoadError {
    #[error("failed to read shader source {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Builds shader programs from source text or files.
///
/// Every entry point returns [`ProgramId::INVALID`] on failure after logging
/// why; callers pass the handle to the renderer, which records the failure.
pub struct ShaderLoader;

impl ShaderLoader {
    pub fn from_strings<B>(backend: &mut B, vertex_source: &str, fragment_source: &str) -> ProgramId
    where
        B: GpuBackend + ?Sized,
    {
        let program = backend.create_program(vertex_source, fragment_source);
        if program.is_valid() {
            log::debug!("shader program {program:?} created");
        } else {
            log::error!("shader program could not be built");
        }
        program
    }

    pub fn from_files<B>(backend: &mut B, vertex_path: impl AsRef<Path>, fragment_path: impl AsRef<Path>) -> ProgramId
    where
        B: GpuBackend + ?Sized,
    {
        match Self::read_sources(vertex_path.as_ref(), fragment_path.as_ref()) {
            Ok((vs, fs)) => Self::from_strings(backend, &vs, &fs),
            Err(e) => {
                log::error!("{e}: {}", io_detail(&e));
                ProgramId::INVALID
            }
        }
    }

    /// The built-in mesh program.
    pub fn default_program<B>(backend: &mut B) -> ProgramId
    where
        B: GpuBackend + ?Sized,
    {
        Self::from_strings(backend, DEFAULT_VERTEX_SOURCE, DEFAULT_FRAGMENT_SOURCE)
    }

    pub fn read_sources(vertex_path: &Path, fragment_path: &Path) -> Result<(String, String), ShaderLoadError> {
        Ok((read_source(vertex_path)?, read_source(fragment_path)?))
    }
}

fn read_source(path: &Path) -> Result<String, ShaderLoadError> {
    std::fs::read_to_string(path).map_err(|source| ShaderLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn io_detail(err: &ShaderLoadError) -> String {
    match err {
        ShaderLoadError::Io { source, .. } => source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::mock::{MockBackend, STANDARD_FS, STANDARD_VS};
    use crate::gfx::wgpu_backend::reflect::{reflect_stage, BindingSlot, ProgramInterface};

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("ember-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    // ── built-in sources ──────────────────────────────────────────────────

    #[test]
    fn default_sources_expose_mesh_interface() {
        let vs = reflect_stage(DEFAULT_VERTEX_SOURCE, naga::ShaderStage::Vertex).unwrap();
        let fs = reflect_stage(DEFAULT_FRAGMENT_SOURCE, naga::ShaderStage::Fragment).unwrap();
        let program = ProgramInterface::link(vs, fs).unwrap();

        assert_eq!(
            program.inputs,
            vec![("pos".to_string(), 0), ("rgb".to_string(), 1), ("uv".to_string(), 2)]
        );

        let mut uniforms: Vec<&str> = program.uniforms.iter().map(|u| u.name.as_str()).collect();
        uniforms.sort();
        assert_eq!(uniforms, vec!["offset", "transform"]);

        assert_eq!(program.textures, vec![BindingSlot { group: 1, binding: 0 }]);
        assert_eq!(program.samplers.len(), 1);
    }

    // ── loading ───────────────────────────────────────────────────────────

    #[test]
    fn from_strings_delegates_to_backend() {
        let mut gpu = MockBackend::new();
        let program = ShaderLoader::from_strings(&mut gpu, STANDARD_VS, STANDARD_FS);
        assert!(program.is_valid());

        let broken = ShaderLoader::from_strings(&mut gpu, "", STANDARD_FS);
        assert_eq!(broken, ProgramId::INVALID);
    }

    #[test]
    fn from_files_reads_both_stages() {
        let vs = temp_file("loader.vs", STANDARD_VS);
        let fs = temp_file("loader.fs", STANDARD_FS);

        let mut gpu = MockBackend::new();
        let program = ShaderLoader::from_files(&mut gpu, &vs, &fs);
        assert!(program.is_valid());
        assert_eq!(gpu.attribute_location(program, "uv"), Some(2));

        let _ = std::fs::remove_file(vs);
        let _ = std::fs::remove_file(fs);
    }

    #[test]
    fn missing_file_is_invalid_program() {
        let mut gpu = MockBackend::new();
        let program = ShaderLoader::from_files(&mut gpu, "/nonexistent/ember.vs", "/nonexistent/ember.fs");
        assert_eq!(program, ProgramId::INVALID);
        assert!(gpu.programs.is_empty());
    }

    #[test]
    fn read_error_names_the_path() {
        let err = ShaderLoader::read_sources(Path::new("/nonexistent/a.wgsl"), Path::new("b.wgsl"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/a.wgsl"));
    }
}
