//! Buffer layout contract shared by the solver renderer's host code and shaders.
//!
//! Two record kinds cross the CPU/GPU boundary: per-frame `Uniforms` and
//! per-vertex `Vertex` attributes. Each has several incompatible schemas, modeled
//! as a closed set of `Pod` structs plus a tagged sum type. Buffers bind at fixed
//! slots declared once per build.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`types`] | lane aliases (`Vec3`, `Mat4`, …), `FieldType` |
//! | [`layout`] | `FieldDecl`, `RecordLayout`, `LayoutRecord`, generic pack/unpack |
//! | [`uniforms`] | `UniformsV1`…`UniformsV5`, `Uniforms`, `UniformsVersion` |
//! | [`vertex`] | `VertexA`, `VertexB`, `Vertex`, `VertexArray`, `MeshStreams` |
//! | [`slots`] | `BufferRole`, `BuildVariant`, `SlotTable`, `AttributeLocation`, `Pairing` |
//! | [`gpu`] | wgpu buffer layouts and slot staging |
//! | [`store`] | `VertexStore` staging arena |
//! | [`palette`] | named vertex colors |
//! | [`error`] | `LayoutError` |
//! | [`logging`] | `init_logging` |
//!
//! # Quick start
//!
//! ```rust
//! use solver_layout::{palette, BufferRole, BuildVariant, VertexA, VertexArray, VertexVersion};
//!
//! let n = [0.0, 0.0, 1.0];
//! let triangle = VertexArray::A(vec![
//!     VertexA::new([0.0, 0.0, 0.0], n, palette::RED),
//!     VertexA::new([0.0, 1.0, 0.0], n, palette::GREEN),
//!     VertexA::new([0.0, 0.0, 0.0], n, palette::BLUE),
//! ]);
//!
//! let bytes = triangle.pack();
//! assert_eq!(bytes.len(), 108);
//! assert_eq!(VertexArray::unpack(&bytes, VertexVersion::A).unwrap(), triangle);
//! assert_eq!(BuildVariant::Interleaved.slot_for(BufferRole::Vertices).unwrap(), 0);
//! ```

pub mod error;
pub mod gpu;
pub mod layout;
pub mod logging;
pub mod palette;
pub mod slots;
pub mod store;
pub mod types;
pub mod uniforms;
pub mod vertex;

pub use error::{LayoutError, MismatchKind};
pub use layout::{
    pack_record, pack_records, unpack_record, unpack_records, FieldDecl, FieldLayout,
    LayoutRecord, RecordLayout,
};
pub use slots::{AttributeLocation, BufferRole, BuildVariant, Pairing, SlotBinding, SlotTable};
pub use store::{VertexRange, VertexStore};
pub use types::FieldType;
pub use uniforms::{
    Uniforms, UniformsV1, UniformsV2, UniformsV3, UniformsV4, UniformsV5, UniformsVersion,
};
pub use vertex::{MeshStreams, Vertex, VertexA, VertexArray, VertexB, VertexVersion};
