//! wgpu-facing half of the contract.
//!
//! - `layouts`: vertex buffer layouts, uniform bind group entries and buffer descriptors
//! - `stage`: writing packed records into the buffers bound at each slot
//!
//! Nothing here owns a device; renderers create resources from these descriptions.

mod layouts;
mod stage;

pub use layouts::{
    interleaved_layout, uniform_buffer_descriptor, uniform_layout_entry, vertex_buffer_layouts,
    vertex_format,
};
pub use stage::{
    stage_uniform_bytes, stage_uniforms, stage_vertices, DrawAction, QueueSlots, SlotWriter,
};
