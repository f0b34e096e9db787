//! Record layouts derived from field declarations.
//!
//! A record is declared once as an ordered list of `FieldDecl`s next to its
//! `#[repr(C)]` struct. Offsets and sizes are derived from declaration order,
//! and a compile-time assertion ties the derived size to `size_of` of the struct.

use bytemuck::Pod;

use crate::error::{LayoutError, MismatchKind};
use crate::types::FieldType;

/// One declared field: name and semantic type, in declaration order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FieldDecl {
    pub name: &'static str,
    pub ty: FieldType,
}

impl FieldDecl {
    #[inline]
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty }
    }
}

/// A field with its resolved byte offset and size.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FieldLayout {
    pub name: &'static str,
    pub ty: FieldType,
    pub offset: usize,
    pub size: usize,
}

#[inline]
const fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

/// Size of a record declared by `fields`, including trailing alignment.
pub const fn record_size(fields: &[FieldDecl]) -> usize {
    let mut offset = 0;
    let mut max_align = 1;
    let mut i = 0;
    while i < fields.len() {
        let ty = fields[i].ty;
        offset = align_up(offset, ty.align()) + ty.size();
        if ty.align() > max_align {
            max_align = ty.align();
        }
        i += 1;
    }
    align_up(offset, max_align)
}

/// Ordered field table of one record variant.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RecordLayout {
    name: &'static str,
    fields: Vec<FieldLayout>,
    size: usize,
}

impl RecordLayout {
    pub fn from_decls(name: &'static str, decls: &[FieldDecl]) -> Self {
        let mut offset = 0;
        let fields = decls
            .iter()
            .map(|d| {
                offset = align_up(offset, d.ty.align());
                let field = FieldLayout { name: d.name, ty: d.ty, offset, size: d.ty.size() };
                offset += d.ty.size();
                field
            })
            .collect();

        Self { name, fields, size: record_size(decls) }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn fields(&self) -> &[FieldLayout] {
        &self.fields
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// FNV-1a hash over the ordered `(name, type, offset)` list.
    ///
    /// The record name is not hashed, so a shader-side declaration with the same
    /// fields produces the same value.
    pub fn fingerprint(&self) -> u64 {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut hash = OFFSET_BASIS;
        let mut feed = |bytes: &[u8]| {
            for b in bytes {
                hash ^= u64::from(*b);
                hash = hash.wrapping_mul(PRIME);
            }
        };

        for f in &self.fields {
            feed(f.name.as_bytes());
            feed(&[0]);
            feed(f.ty.name().as_bytes());
            feed(&[0]);
            feed(&(f.offset as u32).to_le_bytes());
        }
        hash
    }

    /// Checks a shader-side field declaration against this layout.
    ///
    /// Fields must agree in count, order, name and type. Offsets follow from the
    /// types, so they agree whenever the types do.
    pub fn verify(&self, shader: &[(&str, FieldType)]) -> Result<(), LayoutError> {
        if shader.len() != self.fields.len() {
            return Err(LayoutError::mismatch(
                self.name,
                MismatchKind::FieldCount { expected: self.fields.len(), actual: shader.len() },
            ));
        }

        for (index, (host, (name, ty))) in self.fields.iter().zip(shader).enumerate() {
            if host.name != *name || host.ty != *ty {
                return Err(LayoutError::mismatch(
                    self.name,
                    MismatchKind::Field {
                        index,
                        expected: format!("{}: {}", host.name, host.ty),
                        actual: format!("{name}: {ty}"),
                    },
                ));
            }
        }
        Ok(())
    }
}

/// A host struct whose byte image is exactly its declared layout.
///
/// Implementors are `#[repr(C)]` `Pod` structs; `SIZE` must equal `size_of::<Self>()`,
/// which `assert_record_size!` checks at compile time.
pub trait LayoutRecord: Pod {
    const NAME: &'static str;
    const FIELDS: &'static [FieldDecl];
    const SIZE: usize = record_size(Self::FIELDS);

    fn layout() -> RecordLayout {
        RecordLayout::from_decls(Self::NAME, Self::FIELDS)
    }
}

macro_rules! assert_record_size {
    ($($t:ty),+ $(,)?) => {
        $(
            const _: () = assert!(
                std::mem::size_of::<$t>() == <$t as $crate::layout::LayoutRecord>::SIZE,
                "struct size disagrees with its declared layout",
            );
        )+
    };
}
pub(crate) use assert_record_size;

/// Byte image of one record.
#[inline]
pub fn pack_record<T: LayoutRecord>(value: &T) -> Vec<u8> {
    bytemuck::bytes_of(value).to_vec()
}

/// Reads one record; `bytes` must be exactly `T::SIZE` long.
pub fn unpack_record<T: LayoutRecord>(bytes: &[u8]) -> Result<T, LayoutError> {
    if bytes.len() != T::SIZE {
        return Err(LayoutError::mismatch(
            T::NAME,
            MismatchKind::ByteLength { expected: T::SIZE, actual: bytes.len() },
        ));
    }
    Ok(bytemuck::pod_read_unaligned(bytes))
}

/// Byte image of a tightly packed record array.
#[inline]
pub fn pack_records<T: LayoutRecord>(values: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(values).to_vec()
}

/// Reads a record array; `bytes` must be a whole number of `T::SIZE` strides.
pub fn unpack_records<T: LayoutRecord>(bytes: &[u8]) -> Result<Vec<T>, LayoutError> {
    if bytes.len() % T::SIZE != 0 {
        return Err(LayoutError::mismatch(
            T::NAME,
            MismatchKind::Stride { stride: T::SIZE, actual: bytes.len() },
        ));
    }
    Ok(bytes.chunks_exact(T::SIZE).map(bytemuck::pod_read_unaligned).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECLS: &[FieldDecl] = &[
        FieldDecl::new("translation", FieldType::Float3),
        FieldDecl::new("transform", FieldType::Float3x3),
        FieldDecl::new("view_transform", FieldType::Float2),
    ];

    // ── offsets ───────────────────────────────────────────────────────────

    #[test]
    fn offsets_follow_declaration_order() {
        let layout = RecordLayout::from_decls("test", DECLS);
        let offsets: Vec<_> = layout.fields().iter().map(|f| (f.name, f.offset, f.size)).collect();
        assert_eq!(
            offsets,
            vec![("translation", 0, 12), ("transform", 12, 36), ("view_transform", 48, 8)]
        );
        assert_eq!(layout.size(), 56);
        assert_eq!(record_size(DECLS), 56);
    }

    #[test]
    fn empty_record_has_zero_size() {
        assert_eq!(record_size(&[]), 0);
        assert!(RecordLayout::from_decls("empty", &[]).fields().is_empty());
    }

    #[test]
    fn field_lookup_by_name() {
        let layout = RecordLayout::from_decls("test", DECLS);
        assert_eq!(layout.field("transform").map(|f| f.offset), Some(12));
        assert!(layout.field("projection").is_none());
    }

    // ── fingerprint ───────────────────────────────────────────────────────

    #[test]
    fn fingerprint_ignores_record_name() {
        let a = RecordLayout::from_decls("host", DECLS);
        let b = RecordLayout::from_decls("shader", DECLS);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_changes_with_field_order() {
        let swapped = [DECLS[1], DECLS[0], DECLS[2]];
        let a = RecordLayout::from_decls("a", DECLS);
        let b = RecordLayout::from_decls("b", &swapped);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    // ── verify ────────────────────────────────────────────────────────────

    #[test]
    fn verify_accepts_matching_declaration() {
        let layout = RecordLayout::from_decls("test", DECLS);
        let shader = [
            ("translation", FieldType::Float3),
            ("transform", FieldType::Float3x3),
            ("view_transform", FieldType::Float2),
        ];
        assert_eq!(layout.verify(&shader), Ok(()));
    }

    #[test]
    fn verify_rejects_field_count() {
        let layout = RecordLayout::from_decls("test", DECLS);
        let err = layout.verify(&[("translation", FieldType::Float3)]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::mismatch("test", MismatchKind::FieldCount { expected: 3, actual: 1 })
        );
    }

    #[test]
    fn verify_rejects_reordered_fields() {
        let layout = RecordLayout::from_decls("test", DECLS);
        let shader = [
            ("transform", FieldType::Float3x3),
            ("translation", FieldType::Float3),
            ("view_transform", FieldType::Float2),
        ];
        let err = layout.verify(&shader).unwrap_err();
        assert_eq!(
            err,
            LayoutError::mismatch(
                "test",
                MismatchKind::Field {
                    index: 0,
                    expected: "translation: float3".into(),
                    actual: "transform: float3x3".into(),
                }
            )
        );
    }

    #[test]
    fn verify_rejects_type_change() {
        let layout = RecordLayout::from_decls("test", DECLS);
        let shader = [
            ("translation", FieldType::Float4),
            ("transform", FieldType::Float3x3),
            ("view_transform", FieldType::Float2),
        ];
        assert!(layout.verify(&shader).unwrap_err().is_mismatch());
    }
}
