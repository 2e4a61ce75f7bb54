use glam::Mat4;

use crate::gfx::{
    AttributeFormat, BufferId, BufferTarget, DrawCall, GpuBackend, LayoutId, ProgramId,
    TextureId, TextureImage, UniformLocation, UniformValue, VertexAttribute, TEXTURE_UNITS,
};
use crate::mesh::{Mesh, Vertex};

use super::error::{ErrorKind, RendererError};
use super::resource::GpuResource;

const POSITION_NAMES: &[&str] = &["pos", "position"];
const COLOR_NAMES: &[&str] = &["rgb", "color"];
const UV_NAMES: &[&str] = &["uv"];

/// Per-frame inputs for shader uniforms.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameUniforms {
    /// Seconds since start.
    pub time: f32,
    pub transform: Option<Mat4>,
}

impl FrameUniforms {
    pub fn new(time: f32) -> Self {
        Self { time, transform: None }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = Some(transform);
        self
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
struct AttributeLocations {
    position: Option<u32>,
    color: Option<u32>,
    uv: Option<u32>,
}

#[derive(Debug, Copy, Clone, Default)]
struct UniformLocations {
    time: Option<UniformLocation>,
    offset: Option<UniformLocation>,
    transform: Option<UniformLocation>,
}

/// Draws one mesh with one shader program.
///
/// The renderer owns a vertex buffer, an index buffer and a vertex layout, plus
/// up to [`TEXTURE_UNITS`] textures. The shader program is borrowed: whoever
/// created it deletes it.
///
/// Failures go into a single sticky error slot and are also returned from the
/// failing call. While the slot is set, [`render`](Self::render) does nothing.
/// A later successful call does not clear the slot; only
/// [`clear_error`](Self::clear_error) does. A newer failure replaces an older one.
pub struct Renderer<B: GpuBackend> {
    backend: B,
    program: ProgramId,

    vertex_buffer: GpuResource<BufferId>,
    index_buffer: GpuResource<BufferId>,
    layout: GpuResource<LayoutId>,
    textures: [GpuResource<TextureId>; TEXTURE_UNITS],

    attributes: AttributeLocations,
    uniforms: UniformLocations,
    /// Locations currently enabled on the layout.
    enabled: Vec<u32>,
    /// Vertex data was uploaded and verified.
    vertices_ready: bool,
    index_count: u32,

    error: Option<RendererError>,
}

impl<B: GpuBackend> Renderer<B> {
    /// Allocates the mesh buffers and layout and binds `program`.
    ///
    /// Never fails outright: an invalid program or a failed allocation leaves
    /// the renderer in the corresponding error state.
    pub fn new(mut backend: B, program: ProgramId) -> Self {
        let vertex_buffer = GpuResource::new(backend.create_buffer());
        let index_buffer = GpuResource::new(backend.create_buffer());
        let layout = GpuResource::new(backend.create_vertex_layout());

        if let (Some(l), Some(ib)) = (layout.get(), index_buffer.get()) {
            backend.set_index_buffer(l, ib);
        }

        let mut renderer = Self {
            backend,
            program: ProgramId::INVALID,
            vertex_buffer,
            index_buffer,
            layout,
            textures: std::array::from_fn(|_| GpuResource::empty()),
            attributes: AttributeLocations::default(),
            uniforms: UniformLocations::default(),
            enabled: Vec::new(),
            vertices_ready: false,
            index_count: 0,
            error: None,
        };

        renderer.set_shader_program(program);

        if !renderer.vertex_buffer.is_held() || !renderer.index_buffer.is_held() {
            renderer.fail(RendererError::Backend("mesh buffer allocation failed".to_string()));
        }
        if !renderer.layout.is_held() {
            renderer.fail(RendererError::InvalidVao);
        }

        log::debug!("renderer created (program {:?})", program);
        renderer
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Indices drawn per [`render`](Self::render).
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn texture(&self, slot: usize) -> Option<TextureId> {
        self.textures.get(slot).and_then(GpuResource::get)
    }

    /// Switches to `program` and re-resolves attribute and uniform locations.
    ///
    /// Names the program does not declare resolve to nothing and are skipped
    /// when binding. If vertex data is already uploaded, the layout is rebound
    /// against the new locations.
    pub fn set_shader_program(&mut self, program: ProgramId) {
        self.program = program;
        self.attributes = AttributeLocations::default();
        self.uniforms = UniformLocations::default();

        if !program.is_valid() {
            self.disable_attributes();
            self.fail(RendererError::InvalidProgram);
            return;
        }

        let attribute = |names: &[&str]| {
            names
                .iter()
                .find_map(|n| self.backend.attribute_location(program, n))
        };
        self.attributes = AttributeLocations {
            position: attribute(POSITION_NAMES),
            color: attribute(COLOR_NAMES),
            uv: attribute(UV_NAMES),
        };
        self.uniforms = UniformLocations {
            time: self.backend.uniform_location(program, "time"),
            offset: self.backend.uniform_location(program, "offset"),
            transform: self.backend.uniform_location(program, "transform"),
        };
        log::debug!("program {program:?} attributes: {:?}", self.attributes);

        if self.vertices_ready {
            self.bind_attributes();
        }
    }

    /// Uploads `mesh` and verifies the sizes the backend reports.
    ///
    /// On a vertex size mismatch the attributes are disabled, the index upload
    /// is skipped and the index count is left as it was. On an index size
    /// mismatch the index count drops to zero.
    pub fn submit_mesh(&mut self, mesh: &Mesh) -> Result<(), RendererError> {
        if let Err(e) = mesh.validate() {
            log::warn!("submitting malformed mesh: {e}");
        }

        let (Some(vbo), Some(ebo)) = (self.vertex_buffer.get(), self.index_buffer.get()) else {
            return Err(self.fail(RendererError::Backend(
                "mesh buffers were never allocated".to_string(),
            )));
        };

        self.backend.buffer_data(vbo, BufferTarget::Vertex, mesh.vertex_bytes());
        let expected = mesh.vertices.len() as u64 * Vertex::STRIDE;
        let actual = self.backend.buffer_size(vbo);
        if actual != expected {
            self.vertices_ready = false;
            self.disable_attributes();
            return Err(self.fail(RendererError::InvalidVbo { actual, expected }));
        }
        self.vertices_ready = true;

        self.backend.buffer_data(ebo, BufferTarget::Index, mesh.index_bytes());
        let expected = mesh.indices.len() as u64 * size_of::<u32>() as u64;
        let actual = self.backend.buffer_size(ebo);
        if actual != expected {
            self.index_count = 0;
            return Err(self.fail(RendererError::InvalidEbo { actual, expected }));
        }

        self.bind_attributes();
        self.index_count = mesh.indices.len() as u32;

        log::debug!(
            "mesh uploaded: {} vertices, {} indices",
            mesh.vertices.len(),
            mesh.indices.len()
        );
        Ok(())
    }

    /// Draws the current mesh.
    ///
    /// Returns the sticky error untouched if one is set, without any GPU work.
    /// Uniforms the program lacks are skipped.
    pub fn render(&mut self, frame: &FrameUniforms) -> Result<(), RendererError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if !self.program.is_valid() {
            return Err(self.fail(RendererError::InvalidProgram));
        }
        let Some(layout) = self.layout.get() else {
            return Err(self.fail(RendererError::InvalidVao));
        };

        self.set_uniform(self.uniforms.time, UniformValue::F32(frame.time));
        self.set_uniform(self.uniforms.offset, UniformValue::F32(frame.time.sin() / 2.0));
        if let Some(transform) = frame.transform {
            self.set_uniform(self.uniforms.transform, UniformValue::Mat4(transform));
        }

        self.backend.draw_indexed(&DrawCall {
            program: self.program,
            layout,
            textures: std::array::from_fn(|slot| self.textures[slot].get()),
            index_count: self.index_count,
        });
        Ok(())
    }

    /// Uploads `image` into texture unit `slot`, replacing what was there.
    pub fn set_texture(&mut self, slot: usize, image: &TextureImage) -> Result<(), RendererError> {
        if slot >= TEXTURE_UNITS {
            return Err(self.fail(RendererError::Backend(format!(
                "texture slot {slot} out of range (0..{TEXTURE_UNITS})"
            ))));
        }

        let texture = self.backend.create_texture(image);
        if !texture.is_valid() {
            return Err(self.fail(RendererError::Backend(format!(
                "failed to create {}x{} texture for slot {slot}",
                image.width, image.height
            ))));
        }

        self.textures[slot].replace(texture, &mut self.backend);
        log::debug!("texture {texture:?} bound to slot {slot}");
        Ok(())
    }

    /// Releases the texture in `slot`, if any.
    pub fn clear_texture(&mut self, slot: usize) {
        if let Some(t) = self.textures.get_mut(slot) {
            t.release(&mut self.backend);
        }
    }

    pub fn error_kind(&self) -> ErrorKind {
        self.error.as_ref().map_or(ErrorKind::None, RendererError::kind)
    }

    /// Human-readable error, empty when healthy.
    pub fn error_message(&self) -> String {
        self.error.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    pub fn last_error(&self) -> Option<&RendererError> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn fail(&mut self, err: RendererError) -> RendererError {
        log::error!("renderer: {err}");
        self.error = Some(err.clone());
        err
    }

    fn set_uniform(&mut self, location: Option<UniformLocation>, value: UniformValue) {
        if let Some(location) = location {
            self.backend.set_uniform(self.program, location, value);
        }
    }

    fn bind_attributes(&mut self) {
        self.disable_attributes();

        let (Some(layout), Some(vbo)) = (self.layout.get(), self.vertex_buffer.get()) else {
            return;
        };

        let bindings = [
            (self.attributes.position, AttributeFormat::Float32x3, Vertex::POSITION_OFFSET),
            (self.attributes.color, AttributeFormat::Uint32, Vertex::COLOR_OFFSET),
            (self.attributes.uv, AttributeFormat::Float32x2, Vertex::UV_OFFSET),
        ];

        for (location, format, offset) in bindings {
            let Some(location) = location else { continue };
            self.backend.set_vertex_attribute(
                layout,
                location,
                VertexAttribute {
                    buffer: vbo,
                    format,
                    offset,
                    stride: Vertex::STRIDE,
                },
            );
            self.backend.set_attribute_enabled(layout, location, true);
            self.enabled.push(location);
        }
    }

    fn disable_attributes(&mut self) {
        let Some(layout) = self.layout.get() else {
            self.enabled.clear();
            return;
        };
        for location in self.enabled.drain(..) {
            self.backend.set_attribute_enabled(layout, location, false);
        }
    }
}

impl<B: GpuBackend> Drop for Renderer<B> {
    fn drop(&mut self) {
        for texture in &mut self.textures {
            texture.release(&mut self.backend);
        }
        self.layout.release(&mut self.backend);
        self.index_buffer.release(&mut self.backend);
        self.vertex_buffer.release(&mut self.backend);
    }
}
