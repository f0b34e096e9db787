use std::fmt;

use crate::slots::{BufferRole, BuildVariant};
use crate::vertex::VertexVersion;

/// What disagreed when bytes or declarations were checked against a record layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchKind {
    /// Byte length differs from the record size.
    ByteLength { expected: usize, actual: usize },
    /// Byte length of a record array is not a whole number of strides.
    Stride { stride: usize, actual: usize },
    /// Host and shader declare a different number of fields.
    FieldCount { expected: usize, actual: usize },
    /// Field at `index` differs in name or type (`"name: Type"` on both sides).
    Field { index: usize, expected: String, actual: String },
    /// Parallel mesh streams hold a different number of elements.
    StreamLength { positions: usize, colors: usize },
    /// Same number of vertices expected on rewrite of an allocated range.
    VertexCount { expected: usize, actual: usize },
    /// A record of another schema was supplied.
    Version { expected: &'static str, actual: &'static str },
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByteLength { expected, actual } => {
                write!(f, "expected {expected} bytes, got {actual}")
            }
            Self::Stride { stride, actual } => {
                write!(f, "{actual} bytes is not a multiple of the {stride}-byte stride")
            }
            Self::FieldCount { expected, actual } => {
                write!(f, "expected {expected} fields, got {actual}")
            }
            Self::Field { index, expected, actual } => {
                write!(f, "field {index}: expected `{expected}`, got `{actual}`")
            }
            Self::StreamLength { positions, colors } => {
                write!(f, "{positions} positions but {colors} colors")
            }
            Self::VertexCount { expected, actual } => {
                write!(f, "range holds {expected} vertices, got {actual}")
            }
            Self::Version { expected, actual } => write!(f, "expected {expected}, got {actual}"),
        }
    }
}

/// Errors raised by the layout contract.
///
/// Only `LayoutMismatch` is expected at runtime; callers drop the frame's draw
/// and continue. The others are declaration errors surfaced before the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    LayoutMismatch { record: &'static str, kind: MismatchKind },
    UnknownRole { role: BufferRole, build: BuildVariant },
    SlotCollision { slot: u32, first: BufferRole, second: BufferRole },
    DuplicateRole { role: BufferRole, first: u32, second: u32 },
    StoreExhausted { requested: usize, available: usize },
    UnsupportedPairing { build: BuildVariant, vertex: VertexVersion },
}

impl LayoutError {
    pub(crate) fn mismatch(record: &'static str, kind: MismatchKind) -> Self {
        Self::LayoutMismatch { record, kind }
    }

    /// `true` for the recoverable kind (skip this frame's draw).
    #[inline]
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::LayoutMismatch { .. })
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LayoutMismatch { record, kind } => {
                write!(f, "layout mismatch for {record}: {kind}")
            }
            Self::UnknownRole { role, build } => {
                write!(f, "role {role:?} has no slot in the {build:?} build")
            }
            Self::SlotCollision { slot, first, second } => {
                write!(f, "slot {slot} assigned to both {first:?} and {second:?}")
            }
            Self::DuplicateRole { role, first, second } => {
                write!(f, "role {role:?} declared at slot {first} and again at slot {second}")
            }
            Self::StoreExhausted { requested, available } => {
                write!(f, "vertex store exhausted: requested {requested}, {available} left")
            }
            Self::UnsupportedPairing { build, vertex } => {
                write!(f, "the {build:?} build cannot carry {} data", vertex.name())
            }
        }
    }
}

impl std::error::Error for LayoutError {}
