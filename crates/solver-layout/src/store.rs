use std::ops::Range;

use crate::error::{LayoutError, MismatchKind};
use crate::layout::LayoutRecord;

/// Contiguous vertex range handed out by a `VertexStore`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexRange {
    pub start: u32,
    pub count: u32,
}

impl VertexRange {
    /// One past the last vertex, or `None` if the range overflows `u32`.
    #[inline]
    pub fn end(self) -> Option<u32> {
        self.start.checked_add(self.count)
    }

    /// Vertex range for a draw call.
    #[inline]
    pub fn as_draw_range(self) -> Option<Range<u32>> {
        Some(self.start..self.end()?)
    }

    /// Byte range inside the store's upload image.
    pub fn byte_range(self, stride: usize) -> Option<Range<usize>> {
        let start = (self.start as usize).checked_mul(stride)?;
        let len = (self.count as usize).checked_mul(stride)?;
        Some(start..start.checked_add(len)?)
    }

    #[inline]
    fn indices(self) -> Option<Range<usize>> {
        Some(self.start as usize..self.end()? as usize)
    }
}

/// Fixed-capacity, append-only staging store for one vertex schema.
///
/// Geometry builders allocate a range per mesh and may rewrite it in place with the
/// same vertex count. The whole store uploads as one vertex buffer; releasing
/// geometry means building a new store.
#[derive(Debug, Clone)]
pub struct VertexStore<T: LayoutRecord> {
    vertices: Vec<T>,
    capacity: usize,
}

impl<T: LayoutRecord> VertexStore<T> {
    /// Creates an empty store. Draw ranges are `u32`, so `capacity` cannot exceed
    /// `u32::MAX` vertices.
    pub fn with_capacity(capacity: usize) -> Result<Self, LayoutError> {
        if u32::try_from(capacity).is_err() {
            return Err(LayoutError::StoreExhausted {
                requested: capacity,
                available: u32::MAX as usize,
            });
        }
        Ok(Self { vertices: Vec::with_capacity(capacity), capacity })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.vertices.len()
    }

    /// Reserves `count` zeroed vertices.
    pub fn allocate(&mut self, count: usize) -> Result<VertexRange, LayoutError> {
        let exhausted = LayoutError::StoreExhausted { requested: count, available: self.remaining() };
        if count > self.remaining() {
            return Err(exhausted);
        }
        // Both fit: the capacity is bounded by `u32::MAX`.
        let (Ok(start), Ok(count_u32)) = (u32::try_from(self.vertices.len()), u32::try_from(count))
        else {
            return Err(exhausted);
        };
        let range = VertexRange { start, count: count_u32 };
        self.vertices.resize(self.vertices.len() + count, T::zeroed());
        log::trace!("{}: allocated {:?}", T::NAME, range);
        Ok(range)
    }

    /// Allocates a range and fills it with `vertices`.
    pub fn push(&mut self, vertices: &[T]) -> Result<VertexRange, LayoutError> {
        let start = self.vertices.len();
        let range = self.allocate(vertices.len())?;
        self.vertices[start..].copy_from_slice(vertices);
        Ok(range)
    }

    /// Rewrites a range in place. The vertex count cannot change.
    pub fn write(&mut self, range: VertexRange, vertices: &[T]) -> Result<(), LayoutError> {
        if vertices.len() != range.count as usize {
            return Err(LayoutError::mismatch(
                T::NAME,
                MismatchKind::VertexCount { expected: range.count as usize, actual: vertices.len() },
            ));
        }
        let Some(slot) = range.indices().and_then(|r| self.vertices.get_mut(r)) else {
            return Err(LayoutError::mismatch(
                T::NAME,
                MismatchKind::VertexCount { expected: range.count as usize, actual: 0 },
            ));
        };
        slot.copy_from_slice(vertices);
        Ok(())
    }

    /// Vertices of an allocated range, or `None` if the range is not from this store.
    pub fn get(&self, range: VertexRange) -> Option<&[T]> {
        self.vertices.get(range.indices()?)
    }

    /// Applies `f` to each vertex of a range.
    pub fn map(&mut self, range: VertexRange, mut f: impl FnMut(&mut T)) {
        if let Some(slot) = range.indices().and_then(|r| self.vertices.get_mut(r)) {
            slot.iter_mut().for_each(&mut f);
        }
    }

    /// Upload image of all allocated vertices.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
