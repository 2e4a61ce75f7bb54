//! Recording backend for tests.
//!
//! Programs are "compiled" from a tiny declaration language so tests can shape
//! the attribute and uniform tables they need:
//!
//! ```text
//! in pos        // vertex input, locations assigned in order
//! uniform time  // uniform, from either stage
//! ```
//!
//! A source that is empty or contains `#error` fails to compile.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::backend::GpuBackend;
use super::types::{
    BufferId, BufferTarget, DrawCall, LayoutId, ProgramId, TextureId, TextureImage,
    UniformLocation, UniformValue, VertexAttribute,
};

/// Vertex and fragment sources declaring the standard mesh interface.
pub(crate) const STANDARD_VS: &str = "in pos\nin rgb\nin uv\nuniform transform";
pub(crate) const STANDARD_FS: &str = "uniform offset\nuniform time";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Released {
    Buffer(BufferId),
    Layout(LayoutId),
    Program(ProgramId),
    Texture(TextureId),
}

#[derive(Debug, Default)]
pub(crate) struct MockBuffer {
    pub(crate) size: u64,
    pub(crate) target: Option<BufferTarget>,
    pub(crate) uploads: u32,
}

#[derive(Debug, Default)]
pub(crate) struct MockLayout {
    pub(crate) attributes: BTreeMap<u32, VertexAttribute>,
    pub(crate) enabled: BTreeSet<u32>,
    pub(crate) index_buffer: Option<BufferId>,
}

#[derive(Debug, Default)]
pub(crate) struct MockProgram {
    pub(crate) attributes: Vec<String>,
    pub(crate) uniforms: Vec<String>,
    pub(crate) values: HashMap<u32, UniformValue>,
}

#[derive(Debug, Default)]
pub(crate) struct MockBackend {
    next_id: u32,
    pub(crate) buffers: HashMap<BufferId, MockBuffer>,
    pub(crate) layouts: HashMap<LayoutId, MockLayout>,
    pub(crate) programs: HashMap<ProgramId, MockProgram>,
    pub(crate) textures: HashMap<TextureId, (u32, u32)>,
    pub(crate) draws: Vec<DrawCall>,
    pub(crate) released: Vec<Released>,

    /// Bytes dropped from the next upload of each target.
    short_uploads: HashMap<BufferTarget, u64>,
    pub(crate) fail_layouts: bool,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Creates the standard `pos`/`rgb`/`uv` program.
    pub(crate) fn standard_program(&mut self) -> ProgramId {
        self.create_program(STANDARD_VS, STANDARD_FS)
    }

    /// Makes the next upload to `target` come up `missing` bytes short.
    pub(crate) fn short_next_upload(&mut self, target: BufferTarget, missing: u64) {
        self.short_uploads.insert(target, missing);
    }

    pub(crate) fn draw_count(&self) -> usize {
        self.draws.len()
    }

    pub(crate) fn layout(&self, id: LayoutId) -> &MockLayout {
        &self.layouts[&id]
    }

    pub(crate) fn uniform_value(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        let p = self.programs.get(&program)?;
        let slot = p.uniforms.iter().position(|u| u == name)? as u32;
        p.values.get(&slot).copied()
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn parse(source: &str, program: &mut MockProgram) -> bool {
        if source.trim().is_empty() || source.contains("#error") {
            return false;
        }
        for line in source.lines() {
            let mut words = line.split_whitespace();
            match (words.next(), words.next()) {
                (Some("in"), Some(name)) => program.attributes.push(name.to_string()),
                (Some("uniform"), Some(name)) => program.uniforms.push(name.to_string()),
                _ => {}
            }
        }
        true
    }
}

impl GpuBackend for MockBackend {
    fn create_buffer(&mut self) -> BufferId {
        let id = BufferId(self.next());
        self.buffers.insert(id, MockBuffer::default());
        id
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        assert!(self.buffers.remove(&buffer).is_some(), "{buffer:?} released twice");
        self.released.push(Released::Buffer(buffer));
    }

    fn buffer_data(&mut self, buffer: BufferId, target: BufferTarget, data: &[u8]) {
        let missing = self.short_uploads.remove(&target).unwrap_or(0);
        let b = self.buffers.get_mut(&buffer).expect("upload to unknown buffer");
        b.size = (data.len() as u64).saturating_sub(missing);
        b.target = Some(target);
        b.uploads += 1;
    }

    fn buffer_size(&self, buffer: BufferId) -> u64 {
        self.buffers.get(&buffer).map_or(0, |b| b.size)
    }

    fn create_vertex_layout(&mut self) -> LayoutId {
        if self.fail_layouts {
            return LayoutId::INVALID;
        }
        let id = LayoutId(self.next());
        self.layouts.insert(id, MockLayout::default());
        id
    }

    fn delete_vertex_layout(&mut self, layout: LayoutId) {
        assert!(self.layouts.remove(&layout).is_some(), "{layout:?} released twice");
        self.released.push(Released::Layout(layout));
    }

    fn set_index_buffer(&mut self, layout: LayoutId, buffer: BufferId) {
        if let Some(l) = self.layouts.get_mut(&layout) {
            l.index_buffer = Some(buffer);
        }
    }

    fn set_vertex_attribute(&mut self, layout: LayoutId, location: u32, attribute: VertexAttribute) {
        if let Some(l) = self.layouts.get_mut(&layout) {
            l.attributes.insert(location, attribute);
        }
    }

    fn set_attribute_enabled(&mut self, layout: LayoutId, location: u32, enabled: bool) {
        if let Some(l) = self.layouts.get_mut(&layout) {
            if enabled {
                l.enabled.insert(location);
            } else {
                l.enabled.remove(&location);
            }
        }
    }

    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> ProgramId {
        let mut program = MockProgram::default();
        if !Self::parse(vertex_source, &mut program) || !Self::parse(fragment_source, &mut program)
        {
            return ProgramId::INVALID;
        }
        let id = ProgramId(self.next());
        self.programs.insert(id, program);
        id
    }

    fn delete_program(&mut self, program: ProgramId) {
        assert!(self.programs.remove(&program).is_some(), "{program:?} released twice");
        self.released.push(Released::Program(program));
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        let p = self.programs.get(&program)?;
        p.attributes.iter().position(|a| a == name).map(|i| i as u32)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let p = self.programs.get(&program)?;
        p.uniforms
            .iter()
            .position(|u| u == name)
            .map(|i| UniformLocation(i as u32))
    }

    fn set_uniform(&mut self, program: ProgramId, location: UniformLocation, value: UniformValue) {
        if let Some(p) = self.programs.get_mut(&program) {
            p.values.insert(location.0, value);
        }
    }

    fn create_texture(&mut self, image: &TextureImage) -> TextureId {
        if !image.is_well_formed() {
            return TextureId::INVALID;
        }
        let id = TextureId(self.next());
        self.textures.insert(id, (image.width, image.height));
        id
    }

    fn delete_texture(&mut self, texture: TextureId) {
        assert!(self.textures.remove(&texture).is_some(), "{texture:?} released twice");
        self.released.push(Released::Texture(texture));
    }

    fn draw_indexed(&mut self, call: &DrawCall) {
        self.draws.push(call.clone());
    }
}
