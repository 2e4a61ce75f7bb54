use super::types::{
    BufferId, BufferTarget, DrawCall, LayoutId, ProgramId, TextureId, TextureImage,
    UniformLocation, UniformValue, VertexAttribute,
};

/// Handle-based GPU command surface used by the renderer.
///
/// The shape follows a classic bind-and-draw API: buffers and layout objects are
/// opaque `u32` handles, attributes and uniforms are looked up by name on a
/// linked program, and uploads are whole-buffer and static.
///
/// Failure reporting is deliberately thin. Creation calls return the `INVALID`
/// handle, lookups return `None`, and uploads report nothing: callers detect a
/// failed upload by comparing [`buffer_size`](Self::buffer_size) with what they
/// sent.
pub trait GpuBackend {
    // ── buffers ───────────────────────────────────────────────────────────

    fn create_buffer(&mut self) -> BufferId;
    fn delete_buffer(&mut self, buffer: BufferId);

    /// Replaces the buffer's entire contents with `data`.
    fn buffer_data(&mut self, buffer: BufferId, target: BufferTarget, data: &[u8]);

    /// Size of the buffer's storage as reported by the GPU, in bytes.
    fn buffer_size(&self, buffer: BufferId) -> u64;

    // ── vertex layouts ────────────────────────────────────────────────────

    fn create_vertex_layout(&mut self) -> LayoutId;
    fn delete_vertex_layout(&mut self, layout: LayoutId);
    fn set_index_buffer(&mut self, layout: LayoutId, buffer: BufferId);
    fn set_vertex_attribute(&mut self, layout: LayoutId, location: u32, attribute: VertexAttribute);
    fn set_attribute_enabled(&mut self, layout: LayoutId, location: u32, enabled: bool);

    // ── programs ──────────────────────────────────────────────────────────

    /// Compiles and links a program. Returns [`ProgramId::INVALID`] on any
    /// failure (missing source, compile, link or validation error).
    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> ProgramId;
    fn delete_program(&mut self, program: ProgramId);

    /// Location of a named vertex input, or `None` when the program lacks it.
    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<u32>;

    /// Slot of a named uniform, or `None` when the program lacks it.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn set_uniform(&mut self, program: ProgramId, location: UniformLocation, value: UniformValue);

    // ── textures ──────────────────────────────────────────────────────────

    /// Uploads an RGBA8 image. Returns [`TextureId::INVALID`] on failure.
    fn create_texture(&mut self, image: &TextureImage) -> TextureId;
    fn delete_texture(&mut self, texture: TextureId);

    // ── drawing ───────────────────────────────────────────────────────────

    fn draw_indexed(&mut self, call: &DrawCall);
}

impl<B> GpuBackend for &mut B
where
    B: GpuBackend + ?Sized,
{
    fn create_buffer(&mut self) -> BufferId {
        (**self).create_buffer()
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        (**self).delete_buffer(buffer)
    }

    fn buffer_data(&mut self, buffer: BufferId, target: BufferTarget, data: &[u8]) {
        (**self).buffer_data(buffer, target, data)
    }

    fn buffer_size(&self, buffer: BufferId) -> u64 {
        (**self).buffer_size(buffer)
    }

    fn create_vertex_layout(&mut self) -> LayoutId {
        (**self).create_vertex_layout()
    }

    fn delete_vertex_layout(&mut self, layout: LayoutId) {
        (**self).delete_vertex_layout(layout)
    }

    fn set_index_buffer(&mut self, layout: LayoutId, buffer: BufferId) {
        (**self).set_index_buffer(layout, buffer)
    }

    fn set_vertex_attribute(&mut self, layout: LayoutId, location: u32, attribute: VertexAttribute) {
        (**self).set_vertex_attribute(layout, location, attribute)
    }

    fn set_attribute_enabled(&mut self, layout: LayoutId, location: u32, enabled: bool) {
        (**self).set_attribute_enabled(layout, location, enabled)
    }

    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> ProgramId {
        (**self).create_program(vertex_source, fragment_source)
    }

    fn delete_program(&mut self, program: ProgramId) {
        (**self).delete_program(program)
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        (**self).attribute_location(program, name)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        (**self).uniform_location(program, name)
    }

    fn set_uniform(&mut self, program: ProgramId, location: UniformLocation, value: UniformValue) {
        (**self).set_uniform(program, location, value)
    }

    fn create_texture(&mut self, image: &TextureImage) -> TextureId {
        (**self).create_texture(image)
    }

    fn delete_texture(&mut self, texture: TextureId) {
        (**self).delete_texture(texture)
    }

    fn draw_indexed(&mut self, call: &DrawCall) {
        (**self).draw_indexed(call)
    }
}
