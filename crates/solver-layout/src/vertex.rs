//! Per-vertex attribute records.
//!
//! Vertex arrays are tightly packed: the stride is the record size. For the split
//! build, positions and colors travel in two parallel single-attribute streams
//! (`MeshStreams`).

use bytemuck::{Pod, Zeroable};

use crate::error::{LayoutError, MismatchKind};
use crate::layout::{
    assert_record_size, pack_record, pack_records, unpack_record, unpack_records, FieldDecl,
    LayoutRecord, RecordLayout,
};
use crate::types::{FieldType, Vec3};

/// Position, normal and color.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct VertexA {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
}

/// Position and color, no normal.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct VertexB {
    pub position: Vec3,
    pub color: Vec3,
}

impl VertexA {
    #[inline]
    pub const fn new(position: Vec3, normal: Vec3, color: Vec3) -> Self {
        Self { position, normal, color }
    }
}

impl VertexB {
    #[inline]
    pub const fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }
}

impl LayoutRecord for VertexA {
    const NAME: &'static str = "Vertex A";
    const FIELDS: &'static [FieldDecl] = &[
        FieldDecl::new("position", FieldType::Float3),
        FieldDecl::new("normal", FieldType::Float3),
        FieldDecl::new("color", FieldType::Float3),
    ];
}

impl LayoutRecord for VertexB {
    const NAME: &'static str = "Vertex B";
    const FIELDS: &'static [FieldDecl] = &[
        FieldDecl::new("position", FieldType::Float3),
        FieldDecl::new("color", FieldType::Float3),
    ];
}

assert_record_size!(VertexA, VertexB);

/// Schema tag of a `Vertex` record.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexVersion {
    A,
    B,
}

impl VertexVersion {
    pub const ALL: [VertexVersion; 2] = [Self::A, Self::B];

    pub const fn name(self) -> &'static str {
        match self {
            Self::A => VertexA::NAME,
            Self::B => VertexB::NAME,
        }
    }

    /// Record size, which is also the array stride.
    pub const fn stride(self) -> usize {
        match self {
            Self::A => VertexA::SIZE,
            Self::B => VertexB::SIZE,
        }
    }

    pub fn layout(self) -> RecordLayout {
        match self {
            Self::A => VertexA::layout(),
            Self::B => VertexB::layout(),
        }
    }

    #[inline]
    pub const fn has_normal(self) -> bool {
        matches!(self, Self::A)
    }
}

/// A single vertex of any schema.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Vertex {
    A(VertexA),
    B(VertexB),
}

impl Vertex {
    pub fn version(&self) -> VertexVersion {
        match self {
            Self::A(_) => VertexVersion::A,
            Self::B(_) => VertexVersion::B,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        match self {
            Self::A(v) => v.position,
            Self::B(v) => v.position,
        }
    }

    #[inline]
    pub fn color(&self) -> Vec3 {
        match self {
            Self::A(v) => v.color,
            Self::B(v) => v.color,
        }
    }

    pub fn pack(&self) -> Vec<u8> {
        match self {
            Self::A(v) => pack_record(v),
            Self::B(v) => pack_record(v),
        }
    }

    pub fn unpack(bytes: &[u8], version: VertexVersion) -> Result<Self, LayoutError> {
        Ok(match version {
            VertexVersion::A => Self::A(unpack_record(bytes)?),
            VertexVersion::B => Self::B(unpack_record(bytes)?),
        })
    }
}

impl From<VertexA> for Vertex {
    fn from(v: VertexA) -> Self {
        Self::A(v)
    }
}

impl From<VertexB> for Vertex {
    fn from(v: VertexB) -> Self {
        Self::B(v)
    }
}

/// A homogeneous vertex array of any schema, as built by a geometry builder.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexArray {
    A(Vec<VertexA>),
    B(Vec<VertexB>),
}

impl VertexArray {
    pub fn version(&self) -> VertexVersion {
        match self {
            Self::A(_) => VertexVersion::A,
            Self::B(_) => VertexVersion::B,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::A(v) => v.len(),
            Self::B(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Packed bytes; length is `len() * version().stride()`.
    pub fn pack(&self) -> Vec<u8> {
        match self {
            Self::A(v) => pack_records(v),
            Self::B(v) => pack_records(v),
        }
    }

    /// Fails with `LayoutMismatch` unless `bytes` is a whole number of strides.
    ///
    /// Arrays of different schemas can share a byte length (two A vertices and
    /// three B vertices are both 72 bytes), so the schema must come from the
    /// active pairing, never from the length.
    pub fn unpack(bytes: &[u8], version: VertexVersion) -> Result<Self, LayoutError> {
        Ok(match version {
            VertexVersion::A => Self::A(unpack_records(bytes)?),
            VertexVersion::B => Self::B(unpack_records(bytes)?),
        })
    }

    /// Like `unpack`, but also requires exactly `count` vertices.
    pub fn unpack_exact(
        bytes: &[u8],
        version: VertexVersion,
        count: usize,
    ) -> Result<Self, LayoutError> {
        let expected = count * version.stride();
        if bytes.len() != expected {
            return Err(LayoutError::mismatch(
                version.name(),
                MismatchKind::ByteLength { expected, actual: bytes.len() },
            ));
        }
        Self::unpack(bytes, version)
    }
}

const POSITIONS: &str = "MeshPositions";
const COLORS: &str = "MeshColors";

/// Parallel position and color streams for the split-mesh build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshStreams {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
}

impl MeshStreams {
    pub fn from_vertices(vertices: &[VertexB]) -> Self {
        Self {
            positions: vertices.iter().map(|v| v.position).collect(),
            colors: vertices.iter().map(|v| v.color).collect(),
        }
    }

    fn check_lengths(&self) -> Result<(), LayoutError> {
        if self.positions.len() != self.colors.len() {
            return Err(LayoutError::mismatch(
                POSITIONS,
                MismatchKind::StreamLength {
                    positions: self.positions.len(),
                    colors: self.colors.len(),
                },
            ));
        }
        Ok(())
    }

    /// Re-interleaves the streams; they must be the same length.
    pub fn to_vertices(&self) -> Result<Vec<VertexB>, LayoutError> {
        self.check_lengths()?;
        Ok(self
            .positions
            .iter()
            .zip(&self.colors)
            .map(|(p, c)| VertexB::new(*p, *c))
            .collect())
    }

    /// Packed `(positions, colors)` buffers.
    pub fn pack(&self) -> Result<(Vec<u8>, Vec<u8>), LayoutError> {
        self.check_lengths()?;
        Ok((
            bytemuck::cast_slice(&self.positions).to_vec(),
            bytemuck::cast_slice(&self.colors).to_vec(),
        ))
    }

    pub fn unpack(positions: &[u8], colors: &[u8]) -> Result<Self, LayoutError> {
        let streams = Self {
            positions: read_stream(POSITIONS, positions)?,
            colors: read_stream(COLORS, colors)?,
        };
        streams.check_lengths()?;
        Ok(streams)
    }
}

fn read_stream(name: &'static str, bytes: &[u8]) -> Result<Vec<Vec3>, LayoutError> {
    let stride = FieldType::Float3.size();
    if bytes.len() % stride != 0 {
        return Err(LayoutError::mismatch(
            name,
            MismatchKind::Stride { stride, actual: bytes.len() },
        ));
    }
    Ok(bytes.chunks_exact(stride).map(bytemuck::pod_read_unaligned).collect())
}
