//! Per-frame transform records.
//!
//! Five independent schemas exist. Each is its own `Pod` struct; `Uniforms` is the
//! closed sum over them, tagged by `UniformsVersion`.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};

use crate::error::LayoutError;
use crate::layout::{
    assert_record_size, pack_record, unpack_record, FieldDecl, LayoutRecord, RecordLayout,
};
use crate::types::{FieldType, Mat3, Mat4, Vec2, Vec3, MAT3_IDENTITY, MAT4_IDENTITY};

/// Uniform buffer bindings are sized in multiples of this.
pub const UNIFORM_ALIGNMENT: usize = 16;

/// Classic model/view/projection split.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct UniformsV1 {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

/// Single 3x3 transform.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct UniformsV2 {
    pub transform: Mat3,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct UniformsV3 {
    pub transform: Mat3,
    pub projection: Mat4,
}

/// Translation + linear part, with the view reduced to a diagonal scale.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct UniformsV4 {
    pub translation: Vec3,
    pub transform: Mat3,
    pub view_transform: Vec2,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct UniformsV5 {
    pub translation: Vec3,
    pub transform: Mat3,
    pub projection: Mat4,
}

impl LayoutRecord for UniformsV1 {
    const NAME: &'static str = "Uniforms V1";
    const FIELDS: &'static [FieldDecl] = &[
        FieldDecl::new("model", FieldType::Float4x4),
        FieldDecl::new("view", FieldType::Float4x4),
        FieldDecl::new("projection", FieldType::Float4x4),
    ];
}

impl LayoutRecord for UniformsV2 {
    const NAME: &'static str = "Uniforms V2";
    const FIELDS: &'static [FieldDecl] = &[FieldDecl::new("transform", FieldType::Float3x3)];
}

impl LayoutRecord for UniformsV3 {
    const NAME: &'static str = "Uniforms V3";
    const FIELDS: &'static [FieldDecl] = &[
        FieldDecl::new("transform", FieldType::Float3x3),
        FieldDecl::new("projection", FieldType::Float4x4),
    ];
}

impl LayoutRecord for UniformsV4 {
    const NAME: &'static str = "Uniforms V4";
    const FIELDS: &'static [FieldDecl] = &[
        FieldDecl::new("translation", FieldType::Float3),
        FieldDecl::new("transform", FieldType::Float3x3),
        FieldDecl::new("view_transform", FieldType::Float2),
    ];
}

impl LayoutRecord for UniformsV5 {
    const NAME: &'static str = "Uniforms V5";
    const FIELDS: &'static [FieldDecl] = &[
        FieldDecl::new("translation", FieldType::Float3),
        FieldDecl::new("transform", FieldType::Float3x3),
        FieldDecl::new("projection", FieldType::Float4x4),
    ];
}

assert_record_size!(UniformsV1, UniformsV2, UniformsV3, UniformsV4, UniformsV5);

// Identity transforms; the renderer overwrites what it uses each frame.

impl Default for UniformsV1 {
    fn default() -> Self {
        Self { model: MAT4_IDENTITY, view: MAT4_IDENTITY, projection: MAT4_IDENTITY }
    }
}

impl Default for UniformsV2 {
    fn default() -> Self {
        Self { transform: MAT3_IDENTITY }
    }
}

impl Default for UniformsV3 {
    fn default() -> Self {
        Self { transform: MAT3_IDENTITY, projection: MAT4_IDENTITY }
    }
}

impl Default for UniformsV4 {
    fn default() -> Self {
        Self { translation: [0.0; 3], transform: MAT3_IDENTITY, view_transform: [1.0, 1.0] }
    }
}

impl Default for UniformsV5 {
    fn default() -> Self {
        Self { translation: [0.0; 3], transform: MAT3_IDENTITY, projection: MAT4_IDENTITY }
    }
}

/// Schema tag of a `Uniforms` record.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformsVersion {
    V1,
    V2,
    V3,
    V4,
    V5,
}

impl UniformsVersion {
    pub const ALL: [UniformsVersion; 5] = [Self::V1, Self::V2, Self::V3, Self::V4, Self::V5];

    pub const fn name(self) -> &'static str {
        match self {
            Self::V1 => UniformsV1::NAME,
            Self::V2 => UniformsV2::NAME,
            Self::V3 => UniformsV3::NAME,
            Self::V4 => UniformsV4::NAME,
            Self::V5 => UniformsV5::NAME,
        }
    }

    pub const fn size(self) -> usize {
        match self {
            Self::V1 => UniformsV1::SIZE,
            Self::V2 => UniformsV2::SIZE,
            Self::V3 => UniformsV3::SIZE,
            Self::V4 => UniformsV4::SIZE,
            Self::V5 => UniformsV5::SIZE,
        }
    }

    pub fn layout(self) -> RecordLayout {
        match self {
            Self::V1 => UniformsV1::layout(),
            Self::V2 => UniformsV2::layout(),
            Self::V3 => UniformsV3::layout(),
            Self::V4 => UniformsV4::layout(),
            Self::V5 => UniformsV5::layout(),
        }
    }

    /// Record size rounded up to `UNIFORM_ALIGNMENT`; the packed record is written at
    /// offset 0 and the tail stays zeroed.
    pub const fn buffer_size(self) -> usize {
        self.size().next_multiple_of(UNIFORM_ALIGNMENT)
    }

    /// Minimum binding size for a uniform bind group layout entry.
    pub fn min_binding_size(self) -> NonZeroU64 {
        NonZeroU64::new(self.buffer_size() as u64)
            .expect("every uniforms variant declares at least one field")
    }
}

/// A uniforms record of any schema.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Uniforms {
    V1(UniformsV1),
    V2(UniformsV2),
    V3(UniformsV3),
    V4(UniformsV4),
    V5(UniformsV5),
}

impl Uniforms {
    /// Identity-initialized record of the given schema.
    pub fn identity(version: UniformsVersion) -> Self {
        match version {
            UniformsVersion::V1 => Self::V1(UniformsV1::default()),
            UniformsVersion::V2 => Self::V2(UniformsV2::default()),
            UniformsVersion::V3 => Self::V3(UniformsV3::default()),
            UniformsVersion::V4 => Self::V4(UniformsV4::default()),
            UniformsVersion::V5 => Self::V5(UniformsV5::default()),
        }
    }

    pub fn version(&self) -> UniformsVersion {
        match self {
            Self::V1(_) => UniformsVersion::V1,
            Self::V2(_) => UniformsVersion::V2,
            Self::V3(_) => UniformsVersion::V3,
            Self::V4(_) => UniformsVersion::V4,
            Self::V5(_) => UniformsVersion::V5,
        }
    }

    /// Exact byte image; the length is `self.version().size()`.
    pub fn pack(&self) -> Vec<u8> {
        match self {
            Self::V1(u) => pack_record(u),
            Self::V2(u) => pack_record(u),
            Self::V3(u) => pack_record(u),
            Self::V4(u) => pack_record(u),
            Self::V5(u) => pack_record(u),
        }
    }

    /// Reads `bytes` as the given schema.
    ///
    /// Fails with `LayoutMismatch` when the length is not that schema's size. All
    /// five sizes differ, so bytes packed under one schema never read as another.
    pub fn unpack(bytes: &[u8], version: UniformsVersion) -> Result<Self, LayoutError> {
        Ok(match version {
            UniformsVersion::V1 => Self::V1(unpack_record(bytes)?),
            UniformsVersion::V2 => Self::V2(unpack_record(bytes)?),
            UniformsVersion::V3 => Self::V3(unpack_record(bytes)?),
            UniformsVersion::V4 => Self::V4(unpack_record(bytes)?),
            UniformsVersion::V5 => Self::V5(unpack_record(bytes)?),
        })
    }
}

impl From<UniformsV1> for Uniforms {
    fn from(u: UniformsV1) -> Self {
        Self::V1(u)
    }
}

impl From<UniformsV2> for Uniforms {
    fn from(u: UniformsV2) -> Self {
        Self::V2(u)
    }
}

impl From<UniformsV3> for Uniforms {
    fn from(u: UniformsV3) -> Self {
        Self::V3(u)
    }
}

impl From<UniformsV4> for Uniforms {
    fn from(u: UniformsV4) -> Self {
        Self::V4(u)
    }
}

impl From<UniformsV5> for Uniforms {
    fn from(u: UniformsV5) -> Self {
        Self::V5(u)
    }
}
