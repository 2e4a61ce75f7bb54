use std::collections::{BTreeMap, BTreeSet};

use crate::gfx::types::{AttributeFormat, BufferId, ProgramId, VertexAttribute};

use super::reflect::{FRAGMENT_ENTRY, VERTEX_ENTRY};

/// One vertex buffer slot as seen by a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct FetchBuffer {
    pub buffer: BufferId,
    pub stride: u64,
    /// `(location, format, offset)`, sorted by location.
    pub attributes: Vec<(u32, AttributeFormat, u64)>,
}

/// Enabled attributes of a layout grouped into vertex buffer slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct VertexFetch {
    pub buffers: Vec<FetchBuffer>,
}

impl VertexFetch {
    pub(crate) fn from_attributes(
        attributes: &BTreeMap<u32, VertexAttribute>,
        enabled: &BTreeSet<u32>,
    ) -> Self {
        let mut grouped: BTreeMap<BufferId, FetchBuffer> = BTreeMap::new();

        for (&location, attr) in attributes.iter().filter(|(l, _)| enabled.contains(l)) {
            let entry = grouped.entry(attr.buffer).or_insert_with(|| FetchBuffer {
                buffer: attr.buffer,
                stride: attr.stride,
                attributes: Vec::new(),
            });
            if entry.stride != attr.stride {
                log::warn!(
                    "attribute {location} stride {} differs from buffer stride {}; using the latter",
                    attr.stride,
                    entry.stride
                );
            }
            entry.attributes.push((location, attr.format, attr.offset));
        }

        Self {
            buffers: grouped.into_values().collect(),
        }
    }

    pub(crate) fn has_location(&self, location: u32) -> bool {
        self.buffers
            .iter()
            .any(|b| b.attributes.iter().any(|(l, _, _)| *l == location))
    }

    /// Buffer-independent shape, used as part of the pipeline cache key.
    pub(crate) fn shape(&self) -> Vec<(u64, Vec<(u32, AttributeFormat, u64)>)> {
        self.buffers
            .iter()
            .map(|b| (b.stride, b.attributes.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PipelineKey {
    pub program: ProgramId,
    pub shape: Vec<(u64, Vec<(u32, AttributeFormat, u64)>)>,
}

pub(crate) fn vertex_format(format: AttributeFormat) -> wgpu::VertexFormat {
    match format {
        AttributeFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
        AttributeFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
        AttributeFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
        AttributeFormat::Uint32 => wgpu::VertexFormat::Uint32,
    }
}

/// Builds a triangle-list pipeline with back-face culling (CCW front faces)
/// and a layout derived from the shaders.
pub(crate) fn create_pipeline(
    device: &wgpu::Device,
    target_format: wgpu::TextureFormat,
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
    fetch: &VertexFetch,
) -> wgpu::RenderPipeline {
    let attributes: Vec<Vec<wgpu::VertexAttribute>> = fetch
        .buffers
        .iter()
        .map(|b| {
            b.attributes
                .iter()
                .map(|&(location, format, offset)| wgpu::VertexAttribute {
                    format: vertex_format(format),
                    offset,
                    shader_location: location,
                })
                .collect()
        })
        .collect();

    let buffers: Vec<wgpu::VertexBufferLayout<'_>> = fetch
        .buffers
        .iter()
        .zip(&attributes)
        .map(|(b, attrs)| wgpu::VertexBufferLayout {
            array_stride: b.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: attrs,
        })
        .collect();

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("ember mesh pipeline"),
        // Derived from the shaders; bind group layouts come back via
        // `get_bind_group_layout`.
        layout: None,

        vertex: wgpu::VertexState {
            module: vertex,
            entry_point: Some(VERTEX_ENTRY),
            compilation_options: Default::default(),
            buffers: &buffers,
        },

        fragment: Some(wgpu::FragmentState {
            module: fragment,
            entry_point: Some(FRAGMENT_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
