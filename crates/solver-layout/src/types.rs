//! Lane types shared by host structs and shader declarations.
//!
//! Every type is built from `f32` lanes. Matrices are column-major: `m[c][r]`.

use std::fmt;

pub type Vec2 = [f32; 2];
pub type Vec3 = [f32; 3];
pub type Vec4 = [f32; 4];
pub type Mat3 = [[f32; 3]; 3];
pub type Mat4 = [[f32; 4]; 4];

/// Size of one lane in bytes.
pub const LANE_SIZE: usize = std::mem::size_of::<f32>();

pub const MAT3_IDENTITY: Mat3 = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

pub const MAT4_IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Semantic type of one record field.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FieldType {
    Float2,
    Float3,
    Float4,
    Float3x3,
    Float4x4,
}

impl FieldType {
    #[inline]
    pub const fn lanes(self) -> usize {
        match self {
            Self::Float2 => 2,
            Self::Float3 => 3,
            Self::Float4 => 4,
            Self::Float3x3 => 9,
            Self::Float4x4 => 16,
        }
    }

    #[inline]
    pub const fn size(self) -> usize {
        self.lanes() * LANE_SIZE
    }

    /// Natural alignment: that of a single lane.
    #[inline]
    pub const fn align(self) -> usize {
        LANE_SIZE
    }

    #[inline]
    pub const fn is_matrix(self) -> bool {
        matches!(self, Self::Float3x3 | Self::Float4x4)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Float2 => "float2",
            Self::Float3 => "float3",
            Self::Float4 => "float4",
            Self::Float3x3 => "float3x3",
            Self::Float4x4 => "float4x4",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_rust_lane_arrays() {
        assert_eq!(FieldType::Float2.size(), std::mem::size_of::<Vec2>());
        assert_eq!(FieldType::Float3.size(), std::mem::size_of::<Vec3>());
        assert_eq!(FieldType::Float4.size(), std::mem::size_of::<Vec4>());
        assert_eq!(FieldType::Float3x3.size(), std::mem::size_of::<Mat3>());
        assert_eq!(FieldType::Float4x4.size(), std::mem::size_of::<Mat4>());
    }

    #[test]
    fn alignment_is_lane_alignment() {
        assert_eq!(FieldType::Float4x4.align(), std::mem::align_of::<Mat4>());
        assert_eq!(FieldType::Float3.align(), std::mem::align_of::<Vec3>());
    }

    #[test]
    fn only_square_types_are_matrices() {
        assert!(FieldType::Float3x3.is_matrix());
        assert!(FieldType::Float4x4.is_matrix());
        assert!(!FieldType::Float4.is_matrix());
    }

    #[test]
    fn identity_is_column_major_diagonal() {
        for c in 0..4 {
            for r in 0..4 {
                assert_eq!(MAT4_IDENTITY[c][r], if c == r { 1.0 } else { 0.0 });
            }
        }
    }
}
