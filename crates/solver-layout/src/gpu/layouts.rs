use crate::error::LayoutError;
use crate::slots::{BufferRole, BuildVariant, Pairing};
use crate::types::FieldType;
use crate::uniforms::UniformsVersion;
use crate::vertex::VertexVersion;

// Locations follow `AttributeLocation`: position 0, color 1, normal 2.

const VERTEX_A_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    2 => Float32x3, // normal
    1 => Float32x3  // color
];

const VERTEX_B_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    1 => Float32x3  // color
];

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

/// Vertex format of a field type; matrices cannot be vertex attributes.
pub fn vertex_format(ty: FieldType) -> Option<wgpu::VertexFormat> {
    if ty.is_matrix() {
        return None;
    }
    match ty.lanes() {
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        _ => Some(wgpu::VertexFormat::Float32x4),
    }
}

/// Layout of one interleaved vertex buffer.
pub fn interleaved_layout(version: VertexVersion) -> wgpu::VertexBufferLayout<'static> {
    let attributes: &'static [wgpu::VertexAttribute] = match version {
        VertexVersion::A => &VERTEX_A_ATTRS,
        VertexVersion::B => &VERTEX_B_ATTRS,
    };
    wgpu::VertexBufferLayout {
        array_stride: version.stride() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

fn stream_layout(attributes: &'static [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: FieldType::Float3.size() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

/// Vertex buffer layouts for a pairing, ordered by slot.
///
/// The result is meant for `wgpu::VertexState::buffers`, whose index is the slot.
pub fn vertex_buffer_layouts(
    pairing: &Pairing,
) -> Result<Vec<wgpu::VertexBufferLayout<'static>>, LayoutError> {
    let table = pairing.validate()?;

    let mut slotted = match pairing.build {
        BuildVariant::Interleaved => vec![(
            table.slot_for(BufferRole::Vertices)?,
            interleaved_layout(pairing.vertex),
        )],
        BuildVariant::SplitMesh => vec![
            (table.slot_for(BufferRole::MeshPositions)?, stream_layout(&POSITION_ATTRS)),
            (table.slot_for(BufferRole::MeshColors)?, stream_layout(&COLOR_ATTRS)),
        ],
    };
    slotted.sort_by_key(|(slot, _)| *slot);

    Ok(slotted.into_iter().map(|(_, layout)| layout).collect())
}

/// Bind group layout entry for a uniforms record, visible to both stages.
pub fn uniform_layout_entry(version: UniformsVersion, binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: Some(version.min_binding_size()),
        },
        count: None,
    }
}

/// Descriptor of a per-frame uniforms buffer, rewritten with `Queue::write_buffer`.
pub fn uniform_buffer_descriptor(version: UniformsVersion) -> wgpu::BufferDescriptor<'static> {
    wgpu::BufferDescriptor {
        label: Some(version.name()),
        size: version.buffer_size() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    }
}
