use std::collections::{BTreeMap, BTreeSet, HashMap};

use wgpu::util::DeviceExt;

use crate::gfx::backend::GpuBackend;
use crate::gfx::types::{
    BufferId, BufferTarget, DrawCall, LayoutId, ProgramId, TextureId, TextureImage,
    UniformLocation, UniformValue, VertexAttribute,
};

use super::pipeline::{create_pipeline, PipelineKey, VertexFetch};
use super::reflect::{reflect_stage, ProgramInterface, ShaderError};

#[derive(Default)]
struct BufferSlot {
    /// `None` until the first upload.
    buffer: Option<wgpu::Buffer>,
}

#[derive(Default)]
struct LayoutState {
    attributes: BTreeMap<u32, VertexAttribute>,
    enabled: BTreeSet<u32>,
    index_buffer: Option<BufferId>,
}

struct ProgramState {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    interface: ProgramInterface,
    /// Parallel to `interface.uniforms`.
    uniform_buffers: Vec<wgpu::Buffer>,
}

struct TextureState {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Draw resolved against live resources, ready to record.
struct PreparedDraw {
    key: PipelineKey,
    bind_groups: Vec<wgpu::BindGroup>,
    vertex_buffers: Vec<BufferId>,
    index_buffer: BufferId,
    index_count: u32,
}

/// [`GpuBackend`] on top of wgpu.
///
/// Draw calls are queued and recorded into a single render pass by
/// [`encode_pending`](Self::encode_pending), which the frame owner calls once
/// the encoder and target view for the frame exist.
///
/// Resources map onto wgpu as follows:
/// - buffers are recreated on every upload (`create_buffer_init`); the reported
///   size is `wgpu::Buffer::size`
/// - programs are a vertex and a fragment WGSL module with entry points
///   `vs_main` / `fs_main`, validated with naga before wgpu sees them
/// - each uniform owns a small uniform buffer
/// - texture unit `n` is the `n`-th texture binding in `(group, binding)` order;
///   every sampler binding receives the shared repeat/linear sampler
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target_format: wgpu::TextureFormat,

    next_id: u32,
    buffers: HashMap<BufferId, BufferSlot>,
    layouts: HashMap<LayoutId, LayoutState>,
    programs: HashMap<ProgramId, ProgramState>,
    textures: HashMap<TextureId, TextureState>,

    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    sampler: wgpu::Sampler,
    fallback_texture: TextureState,

    pending: Vec<DrawCall>,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, target_format: wgpu::TextureFormat) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ember sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = TextureImage::from_rgba32(1, 1, &[crate::paint::OPAQUE_WHITE]);
        let fallback_texture = upload_texture(&device, &queue, &white);

        Self {
            device,
            queue,
            target_format,
            next_id: 0,
            buffers: HashMap::new(),
            layouts: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            pipelines: HashMap::new(),
            sampler,
            fallback_texture,
            pending: Vec::new(),
        }
    }

    #[inline]
    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    /// Changes the color target format; cached pipelines are rebuilt lazily.
    pub fn set_target_format(&mut self, format: wgpu::TextureFormat) {
        if format != self.target_format {
            self.target_format = format;
            self.pipelines.clear();
        }
    }

    /// Number of queued draws not yet encoded.
    #[inline]
    pub fn pending_draws(&self) -> usize {
        self.pending.len()
    }

    /// Records all queued draws into one render pass over `view`.
    ///
    /// The pass loads the existing contents, so clearing is the caller's job.
    /// Draws whose resources are missing or incomplete are skipped with a
    /// warning rather than handed to wgpu.
    pub fn encode_pending(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let draws = std::mem::take(&mut self.pending);
        let prepared: Vec<PreparedDraw> = draws.iter().filter_map(|d| self.prepare(d)).collect();
        if prepared.is_empty() {
            return;
        }

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ember mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for draw in &prepared {
            let Some(pipeline) = self.pipelines.get(&draw.key) else { continue };
            let Some(index_buffer) = self.wgpu_buffer(draw.index_buffer) else { continue };

            rpass.set_pipeline(pipeline);
            for (group, bind_group) in draw.bind_groups.iter().enumerate() {
                rpass.set_bind_group(group as u32, bind_group, &[]);
            }
            for (slot, id) in draw.vertex_buffers.iter().enumerate() {
                if let Some(buffer) = self.wgpu_buffer(*id) {
                    rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }
            }
            rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..draw.index_count, 0, 0..1);
        }
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn wgpu_buffer(&self, id: BufferId) -> Option<&wgpu::Buffer> {
        self.buffers.get(&id).and_then(|slot| slot.buffer.as_ref())
    }

    fn compile(&self, vertex_source: &str, fragment_source: &str) -> Result<ProgramState, ShaderError> {
        let vertex_interface = reflect_stage(vertex_source, naga::ShaderStage::Vertex)?;
        let fragment_interface = reflect_stage(fragment_source, naga::ShaderStage::Fragment)?;
        let interface = ProgramInterface::link(vertex_interface, fragment_interface)?;

        let vertex = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ember vertex shader"),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fragment = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ember fragment shader"),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });

        let uniform_buffers = interface
            .uniforms
            .iter()
            .map(|u| {
                self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("ember uniform"),
                    size: u.size.max(16).next_multiple_of(16),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        Ok(ProgramState {
            vertex,
            fragment,
            interface,
            uniform_buffers,
        })
    }

    fn prepare(&mut self, call: &DrawCall) -> Option<PreparedDraw> {
        if call.index_count == 0 {
            return None;
        }

        let Some(program) = self.programs.get(&call.program) else {
            log::warn!("draw skipped: unknown program {:?}", call.program);
            return None;
        };
        let Some(layout) = self.layouts.get(&call.layout) else {
            log::warn!("draw skipped: unknown vertex layout {:?}", call.layout);
            return None;
        };

        let index_buffer = layout.index_buffer?;
        let index_bytes = self
            .buffers
            .get(&index_buffer)
            .and_then(|s| s.buffer.as_ref())
            .map_or(0, |b| b.size());
        if index_bytes < call.index_count as u64 * 4 {
            log::warn!(
                "draw skipped: {} indices requested but index buffer holds {index_bytes} bytes",
                call.index_count
            );
            return None;
        }

        let fetch = VertexFetch::from_attributes(&layout.attributes, &layout.enabled);
        if let Some((name, location)) = program
            .interface
            .inputs
            .iter()
            .find(|(_, location)| !fetch.has_location(*location))
        {
            log::warn!("draw skipped: vertex input `{name}` (location {location}) has no enabled attribute");
            return None;
        }
        if fetch
            .buffers
            .iter()
            .any(|b| self.buffers.get(&b.buffer).and_then(|s| s.buffer.as_ref()).is_none())
        {
            log::warn!("draw skipped: vertex buffer has never been uploaded");
            return None;
        }

        let key = PipelineKey {
            program: call.program,
            shape: fetch.shape(),
        };
        if !self.pipelines.contains_key(&key) {
            log::debug!("creating pipeline for program {:?}", call.program);
            let pipeline = create_pipeline(
                &self.device,
                self.target_format,
                &program.vertex,
                &program.fragment,
                &fetch,
            );
            self.pipelines.insert(key.clone(), pipeline);
        }
        let pipeline = &self.pipelines[&key];

        let groups = program.interface.max_group().map_or(0, |g| g + 1);
        let mut bind_groups = Vec::with_capacity(groups as usize);
        for group in 0..groups {
            let mut entries = Vec::new();

            for (u, buffer) in program.interface.uniforms.iter().zip(&program.uniform_buffers) {
                if u.slot.group == group {
                    entries.push(wgpu::BindGroupEntry {
                        binding: u.slot.binding,
                        resource: buffer.as_entire_binding(),
                    });
                }
            }

            for (unit, slot) in program.interface.textures.iter().enumerate() {
                if slot.group != group {
                    continue;
                }
                let view = call
                    .textures
                    .get(unit)
                    .copied()
                    .flatten()
                    .and_then(|t| self.textures.get(&t))
                    .map_or(&self.fallback_texture.view, |t| &t.view);
                entries.push(wgpu::BindGroupEntry {
                    binding: slot.binding,
                    resource: wgpu::BindingResource::TextureView(view),
                });
            }

            for slot in program.interface.samplers.iter().filter(|s| s.group == group) {
                entries.push(wgpu::BindGroupEntry {
                    binding: slot.binding,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                });
            }

            let layout = pipeline.get_bind_group_layout(group);
            bind_groups.push(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("ember bind group"),
                layout: &layout,
                entries: &entries,
            }));
        }

        Some(PreparedDraw {
            key,
            bind_groups,
            vertex_buffers: fetch.buffers.iter().map(|b| b.buffer).collect(),
            index_buffer,
            index_count: call.index_count,
        })
    }
}

fn upload_texture(device: &wgpu::Device, queue: &wgpu::Queue, image: &TextureImage) -> TextureState {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("ember texture"),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.pixels,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    TextureState {
        _texture: texture,
        view,
    }
}

impl GpuBackend for WgpuBackend {
    fn create_buffer(&mut self) -> BufferId {
        let id = BufferId(self.next());
        self.buffers.insert(id, BufferSlot::default());
        id
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if self.buffers.remove(&buffer).is_none() {
            log::warn!("delete of unknown buffer {buffer:?}");
        }
    }

    fn buffer_data(&mut self, buffer: BufferId, target: BufferTarget, data: &[u8]) {
        let Some(slot) = self.buffers.get_mut(&buffer) else {
            log::warn!("upload to unknown buffer {buffer:?}");
            return;
        };

        let usage = match target {
            BufferTarget::Vertex => wgpu::BufferUsages::VERTEX,
            BufferTarget::Index => wgpu::BufferUsages::INDEX,
        } | wgpu::BufferUsages::COPY_DST;

        slot.buffer = Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(match target {
                BufferTarget::Vertex => "ember vertex buffer",
                BufferTarget::Index => "ember index buffer",
            }),
            contents: data,
            usage,
        }));
    }

    fn buffer_size(&self, buffer: BufferId) -> u64 {
        self.wgpu_buffer(buffer).map_or(0, |b| b.size())
    }

    fn create_vertex_layout(&mut self) -> LayoutId {
        let id = LayoutId(self.next());
        self.layouts.insert(id, LayoutState::default());
        id
    }

    fn delete_vertex_layout(&mut self, layout: LayoutId) {
        if self.layouts.remove(&layout).is_none() {
            log::warn!("delete of unknown vertex layout {layout:?}");
        }
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
        match self.compile(vertex_source, fragment_source) {
            Ok(state) => {
                let id = ProgramId(self.next());
                log::debug!(
                    "program {id:?}: {} inputs, {} uniforms, {} texture units",
                    state.interface.inputs.len(),
                    state.interface.uniforms.len(),
                    state.interface.textures.len()
                );
                self.programs.insert(id, state);
                id
            }
            Err(e) => {
                log::error!("shader program creation failed: {e}");
                ProgramId::INVALID
            }
        }
    }

    fn delete_program(&mut self, program: ProgramId) {
        if self.programs.remove(&program).is_some() {
            self.pipelines.retain(|key, _| key.program != program);
        }
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        let p = self.programs.get(&program)?;
        p.interface
            .inputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, location)| *location)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let p = self.programs.get(&program)?;
        p.interface
            .uniforms
            .iter()
            .position(|u| u.name == name)
            .map(|i| UniformLocation(i as u32))
    }

    fn set_uniform(&mut self, program: ProgramId, location: UniformLocation, value: UniformValue) {
        let Some(p) = self.programs.get(&program) else { return };
        let index = location.0 as usize;
        let (Some(slot), Some(buffer)) = (p.interface.uniforms.get(index), p.uniform_buffers.get(index))
        else {
            return;
        };

        let bytes = value.to_bytes();
        if bytes.len() as u64 > slot.size {
            log::warn!(
                "uniform `{}` holds {} bytes; refusing {}-byte write",
                slot.name,
                slot.size,
                bytes.len()
            );
            return;
        }
        self.queue.write_buffer(buffer, 0, &bytes);
    }

    fn create_texture(&mut self, image: &TextureImage) -> TextureId {
        if !image.is_well_formed() {
            log::error!(
                "texture {}x{} has {} bytes of pixel data",
                image.width,
                image.height,
                image.pixels.len()
            );
            return TextureId::INVALID;
        }
        let state = upload_texture(&self.device, &self.queue, image);
        let id = TextureId(self.next());
        self.textures.insert(id, state);
        id
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if self.textures.remove(&texture).is_none() {
            log::warn!("delete of unknown texture {texture:?}");
        }
    }

    fn draw_indexed(&mut self, call: &DrawCall) {
        self.pending.push(call.clone());
    }
}
