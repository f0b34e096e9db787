//! Buffer slot tables.
//!
//! Slots are small integers identifying which buffer a shader stage reads for a
//! role. Each build declares its table once; the built-in tables are checked for
//! collisions at compile time.

use crate::error::LayoutError;
use crate::uniforms::UniformsVersion;
use crate::vertex::VertexVersion;

/// Logical role of a bound buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferRole {
    /// Interleaved vertex records.
    Vertices,
    Uniforms,
    /// Position-only stream, parallel to `MeshColors`.
    MeshPositions,
    /// Color-only stream, parallel to `MeshPositions`.
    MeshColors,
}

/// One `role → slot` assignment.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SlotBinding {
    pub role: BufferRole,
    pub slot: u32,
}

impl SlotBinding {
    #[inline]
    pub const fn new(role: BufferRole, slot: u32) -> Self {
        Self { role, slot }
    }
}

const INTERLEAVED: &[SlotBinding] = &[
    SlotBinding::new(BufferRole::Vertices, 0),
    SlotBinding::new(BufferRole::Uniforms, 1),
];

const SPLIT_MESH: &[SlotBinding] = &[
    SlotBinding::new(BufferRole::MeshPositions, 0),
    SlotBinding::new(BufferRole::MeshColors, 1),
    SlotBinding::new(BufferRole::Uniforms, 2),
];

/// `true` when no slot and no role appears twice.
pub const fn bindings_are_unique(bindings: &[SlotBinding]) -> bool {
    let mut i = 0;
    while i < bindings.len() {
        let mut j = i + 1;
        while j < bindings.len() {
            if bindings[i].slot == bindings[j].slot
                || bindings[i].role as u8 == bindings[j].role as u8
            {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(bindings_are_unique(INTERLEAVED), "interleaved slot table collides");
const _: () = assert!(bindings_are_unique(SPLIT_MESH), "split-mesh slot table collides");

/// Declared slot layout of a renderer build.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BuildVariant {
    /// One interleaved vertex buffer plus uniforms.
    Interleaved,
    /// Parallel position and color buffers plus uniforms.
    SplitMesh,
}

impl BuildVariant {
    pub const ALL: [BuildVariant; 2] = [Self::Interleaved, Self::SplitMesh];

    #[inline]
    pub const fn bindings(self) -> &'static [SlotBinding] {
        match self {
            Self::Interleaved => INTERLEAVED,
            Self::SplitMesh => SPLIT_MESH,
        }
    }

    /// Slot of `role` in this build's built-in table.
    pub fn slot_for(self, role: BufferRole) -> Result<u32, LayoutError> {
        self.bindings()
            .iter()
            .find(|b| b.role == role)
            .map(|b| b.slot)
            .ok_or(LayoutError::UnknownRole { role, build: self })
    }

    /// Built-in table of this build.
    pub fn table(self) -> SlotTable {
        SlotTable { build: self, bindings: self.bindings().to_vec() }
    }
}

/// A validated slot table.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlotTable {
    build: BuildVariant,
    bindings: Vec<SlotBinding>,
}

impl SlotTable {
    /// Validates a custom declaration for `build`.
    ///
    /// Two roles on one slot is a `SlotCollision`; one role on two slots is a
    /// `DuplicateRole`.
    pub fn new(
        build: BuildVariant,
        bindings: impl IntoIterator<Item = SlotBinding>,
    ) -> Result<Self, LayoutError> {
        let mut accepted: Vec<SlotBinding> = Vec::new();
        for b in bindings {
            if let Some(prev) = accepted.iter().find(|p| p.slot == b.slot) {
                return Err(LayoutError::SlotCollision {
                    slot: b.slot,
                    first: prev.role,
                    second: b.role,
                });
            }
            if let Some(prev) = accepted.iter().find(|p| p.role == b.role) {
                return Err(LayoutError::DuplicateRole {
                    role: b.role,
                    first: prev.slot,
                    second: b.slot,
                });
            }
            accepted.push(b);
        }
        log::debug!("validated {build:?} slot table with {} bindings", accepted.len());
        Ok(Self { build, bindings: accepted })
    }

    #[inline]
    pub fn build(&self) -> BuildVariant {
        self.build
    }

    #[inline]
    pub fn bindings(&self) -> &[SlotBinding] {
        &self.bindings
    }

    pub fn slot_for(&self, role: BufferRole) -> Result<u32, LayoutError> {
        self.bindings
            .iter()
            .find(|b| b.role == role)
            .map(|b| b.slot)
            .ok_or(LayoutError::UnknownRole { role, build: self.build })
    }

    #[inline]
    pub fn contains(&self, role: BufferRole) -> bool {
        self.bindings.iter().any(|b| b.role == role)
    }
}

/// Vertex attribute locations; a namespace separate from buffer slots.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum AttributeLocation {
    Position = 0,
    Color = 1,
    Normal = 2,
}

impl AttributeLocation {
    #[inline]
    pub const fn location(self) -> u32 {
        self as u32
    }

    /// Location of a vertex field by its declared name.
    pub fn for_field(name: &str) -> Option<Self> {
        match name {
            "position" => Some(Self::Position),
            "color" => Some(Self::Color),
            "normal" => Some(Self::Normal),
            _ => None,
        }
    }
}

/// The active host/shader agreement: one build, one uniforms schema, one vertex schema.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Pairing {
    pub build: BuildVariant,
    pub uniforms: UniformsVersion,
    pub vertex: VertexVersion,
}

impl Default for Pairing {
    fn default() -> Self {
        Self {
            build: BuildVariant::Interleaved,
            uniforms: UniformsVersion::V1,
            vertex: VertexVersion::A,
        }
    }
}

impl Pairing {
    #[inline]
    pub const fn new(build: BuildVariant, uniforms: UniformsVersion, vertex: VertexVersion) -> Self {
        Self { build, uniforms, vertex }
    }

    /// Checks the vertex schema can be carried by the build, and returns its table.
    ///
    /// The split build has no normal stream, so only Vertex B fits it.
    pub fn validate(&self) -> Result<SlotTable, LayoutError> {
        if self.build == BuildVariant::SplitMesh && self.vertex.has_normal() {
            return Err(LayoutError::UnsupportedPairing { build: self.build, vertex: self.vertex });
        }
        let table = self.build.table();
        if !table.contains(BufferRole::Uniforms) {
            return Err(LayoutError::UnknownRole { role: BufferRole::Uniforms, build: self.build });
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── built-in tables ───────────────────────────────────────────────────

    #[test]
    fn interleaved_slots() {
        let t = BuildVariant::Interleaved.table();
        assert_eq!(t.slot_for(BufferRole::Vertices), Ok(0));
        assert_eq!(t.slot_for(BufferRole::Uniforms), Ok(1));
    }

    #[test]
    fn split_mesh_moves_uniforms_to_slot_2() {
        let t = BuildVariant::SplitMesh.table();
        assert_eq!(t.slot_for(BufferRole::MeshPositions), Ok(0));
        assert_eq!(t.slot_for(BufferRole::MeshColors), Ok(1));
        assert_eq!(t.slot_for(BufferRole::Uniforms), Ok(2));
        assert!(t.contains(BufferRole::MeshColors));
        assert!(!t.contains(BufferRole::Vertices));
    }

    #[test]
    fn undeclared_role_is_unknown() {
        assert_eq!(
            BuildVariant::Interleaved.slot_for(BufferRole::MeshColors),
            Err(LayoutError::UnknownRole {
                role: BufferRole::MeshColors,
                build: BuildVariant::Interleaved,
            })
        );
        assert!(BuildVariant::SplitMesh.table().slot_for(BufferRole::Vertices).is_err());
    }

    #[test]
    fn builtin_tables_are_unique() {
        for build in BuildVariant::ALL {
            assert!(bindings_are_unique(build.bindings()));
            assert!(SlotTable::new(build, build.bindings().iter().copied()).is_ok());
        }
    }

    // ── custom declarations ───────────────────────────────────────────────

    #[test]
    fn two_roles_on_one_slot_collide() {
        let err = SlotTable::new(
            BuildVariant::SplitMesh,
            [
                SlotBinding::new(BufferRole::MeshPositions, 0),
                SlotBinding::new(BufferRole::MeshColors, 1),
                SlotBinding::new(BufferRole::Uniforms, 1),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::SlotCollision {
                slot: 1,
                first: BufferRole::MeshColors,
                second: BufferRole::Uniforms,
            }
        );
    }

    #[test]
    fn one_role_on_two_slots_is_rejected() {
        let err = SlotTable::new(
            BuildVariant::Interleaved,
            [
                SlotBinding::new(BufferRole::Uniforms, 1),
                SlotBinding::new(BufferRole::Uniforms, 2),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::DuplicateRole { role: BufferRole::Uniforms, first: 1, second: 2 }
        );
    }

    #[test]
    fn const_check_catches_collisions() {
        const BAD: &[SlotBinding] = &[
            SlotBinding::new(BufferRole::Vertices, 0),
            SlotBinding::new(BufferRole::Uniforms, 0),
        ];
        assert!(!bindings_are_unique(BAD));
    }

    // ── attributes & pairing ──────────────────────────────────────────────

    #[test]
    fn attribute_locations() {
        assert_eq!(AttributeLocation::Position.location(), 0);
        assert_eq!(AttributeLocation::Color.location(), 1);
        assert_eq!(AttributeLocation::for_field("normal"), Some(AttributeLocation::Normal));
        assert_eq!(AttributeLocation::for_field("uv"), None);
    }

    #[test]
    fn default_pairing_is_valid() {
        let table = Pairing::default().validate().unwrap();
        assert_eq!(table.build(), BuildVariant::Interleaved);
    }

    #[test]
    fn split_build_rejects_normals() {
        let p = Pairing::new(BuildVariant::SplitMesh, UniformsVersion::V2, VertexVersion::A);
        assert_eq!(
            p.validate().unwrap_err(),
            LayoutError::UnsupportedPairing {
                build: BuildVariant::SplitMesh,
                vertex: VertexVersion::A,
            }
        );
        let p = Pairing { vertex: VertexVersion::B, ..p };
        assert!(p.validate().is_ok());
    }
}
