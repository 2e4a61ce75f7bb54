//! WGSL validation and interface reflection via naga.
//!
//! wgpu reports shader errors through its device error callback, which by
//! default aborts. Sources are therefore parsed and validated here first, and
//! only handed to wgpu once they are known to be good. The same pass extracts
//! the names the renderer looks up: vertex inputs, uniforms and texture
//! bindings.

use thiserror::Error;

pub(crate) const VERTEX_ENTRY: &str = "vs_main";
pub(crate) const FRAGMENT_ENTRY: &str = "fs_main";

#[derive(Debug, Clone, Error)]
pub enum ShaderError {
    #[error("{stage} source is empty")]
    EmptySource { stage: &'static str },
    #[error("failed to parse {stage}:\n{message}")]
    Parse { stage: &'static str, message: String },
    #[error("{stage} failed validation: {message}")]
    Validation { stage: &'static str, message: String },
    #[error("{stage} has no `{entry}` entry point")]
    MissingEntryPoint { stage: &'static str, entry: &'static str },
    #[error("uniform `{name}` is bound at ({group}, {binding}) in one stage and elsewhere in the other")]
    ConflictingUniform { name: String, group: u32, binding: u32 },
}

/// Resource slot in `@group(g) @binding(b)` space.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct BindingSlot {
    pub group: u32,
    pub binding: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UniformSlot {
    pub name: String,
    pub slot: BindingSlot,
    pub size: u64,
}

/// Everything one entry point reads from outside its own arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StageInterface {
    /// Vertex inputs as `(name, location)`; empty for fragment stages.
    pub inputs: Vec<(String, u32)>,
    pub uniforms: Vec<UniformSlot>,
    pub textures: Vec<BindingSlot>,
    pub samplers: Vec<BindingSlot>,
}

/// Merged interface of a vertex + fragment pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ProgramInterface {
    pub inputs: Vec<(String, u32)>,
    pub uniforms: Vec<UniformSlot>,
    /// Texture units in binding order.
    pub textures: Vec<BindingSlot>,
    pub samplers: Vec<BindingSlot>,
}

impl ProgramInterface {
    pub(crate) fn link(vertex: StageInterface, fragment: StageInterface) -> Result<Self, ShaderError> {
        let mut uniforms = vertex.uniforms;
        for u in fragment.uniforms {
            match uniforms.iter().find(|v| v.name == u.name) {
                Some(v) if v.slot == u.slot => {}
                Some(_) => {
                    return Err(ShaderError::ConflictingUniform {
                        name: u.name,
                        group: u.slot.group,
                        binding: u.slot.binding,
                    });
                }
                None => uniforms.push(u),
            }
        }

        let mut textures = vertex.textures;
        textures.extend(fragment.textures);
        textures.sort();
        textures.dedup();

        let mut samplers = vertex.samplers;
        samplers.extend(fragment.samplers);
        samplers.sort();
        samplers.dedup();

        Ok(Self {
            inputs: vertex.inputs,
            uniforms,
            textures,
            samplers,
        })
    }

    /// Highest bind group index used, if any resource is bound.
    pub(crate) fn max_group(&self) -> Option<u32> {
        self.uniforms
            .iter()
            .map(|u| u.slot.group)
            .chain(self.textures.iter().map(|t| t.group))
            .chain(self.samplers.iter().map(|s| s.group))
            .max()
    }
}

/// Parses, validates and reflects one stage.
pub(crate) fn reflect_stage(
    source: &str,
    stage: naga::ShaderStage,
) -> Result<StageInterface, ShaderError> {
    let (label, entry) = match stage {
        naga::ShaderStage::Vertex => ("vertex shader", VERTEX_ENTRY),
        naga::ShaderStage::Fragment => ("fragment shader", FRAGMENT_ENTRY),
        _ => ("compute shader", "main"),
    };

    if source.trim().is_empty() {
        return Err(ShaderError::EmptySource { stage: label });
    }

    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Parse {
        stage: label,
        message: e.emit_to_string(source),
    })?;

    let mut validator =
        naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::all());
    let info = validator.validate(&module).map_err(|e| ShaderError::Validation {
        stage: label,
        message: e.to_string(),
    })?;

    let (index, entry_point) = module
        .entry_points
        .iter()
        .enumerate()
        .find(|(_, ep)| ep.stage == stage && ep.name == entry)
        .ok_or(ShaderError::MissingEntryPoint { stage: label, entry })?;

    let mut interface = StageInterface::default();

    if stage == naga::ShaderStage::Vertex {
        for arg in &entry_point.function.arguments {
            collect_inputs(&module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut interface.inputs);
        }
        interface.inputs.sort_by_key(|(_, location)| *location);
    }

    // Only globals the entry point touches end up in wgpu's derived layout.
    let usage = info.get_entry_point(index);
    for (handle, var) in module.global_variables.iter() {
        if usage[handle].is_empty() {
            continue;
        }
        let Some(binding) = var.binding.as_ref() else { continue };
        let slot = BindingSlot {
            group: binding.group,
            binding: binding.binding,
        };
        let inner = &module.types[var.ty].inner;

        match var.space {
            naga::AddressSpace::Uniform => {
                let Some(name) = var.name.clone() else { continue };
                interface.uniforms.push(UniformSlot {
                    name,
                    slot,
                    size: inner.size(module.to_ctx()) as u64,
                });
            }
            naga::AddressSpace::Handle => match inner {
                naga::TypeInner::Image { .. } => interface.textures.push(slot),
                naga::TypeInner::Sampler { .. } => interface.samplers.push(slot),
                _ => {}
            },
            _ => {}
        }
    }

    Ok(interface)
}

fn collect_inputs(
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<(String, u32)>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            if let Some(name) = name {
                out.push((name.to_string(), *location));
            }
        }
        Some(_) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_inputs(module, m.name.as_deref(), m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}
