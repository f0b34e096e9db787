use crate::error::{LayoutError, MismatchKind};
use crate::slots::{BufferRole, BuildVariant, Pairing};
use crate::uniforms::Uniforms;
use crate::vertex::{MeshStreams, VertexArray};

/// What the caller should do with this frame's draw after staging.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawAction {
    /// Data is in place; submit the draw.
    Submit,
    /// Staging failed recoverably; skip the draw and try again next frame.
    SkipFrame,
}

/// Destination for packed bytes, addressed by buffer slot.
///
/// One writer per slot per frame; the frame orchestrator guarantees writes finish
/// before the draw that reads the slot is submitted. Staging asks `accepts` for every
/// target slot before writing any of them, so a draw never sees half its buffers updated.
pub trait SlotWriter {
    /// Whether `len` bytes can be written at the start of the buffer bound at `slot`.
    fn accepts(&self, slot: u32, len: usize) -> bool;

    /// Writes `bytes` at the start of the buffer bound at `slot`.
    ///
    /// Returns `false` if nothing can receive the bytes.
    fn write_slot(&mut self, slot: u32, bytes: &[u8]) -> bool;
}

/// `SlotWriter` backed by a wgpu queue and the buffer bound at each slot.
pub struct QueueSlots<'a> {
    queue: &'a wgpu::Queue,
    buffers: Vec<(u32, &'a wgpu::Buffer)>,
}

impl<'a> QueueSlots<'a> {
    #[inline]
    pub fn new(queue: &'a wgpu::Queue) -> Self {
        Self { queue, buffers: Vec::new() }
    }

    /// Binds `buffer` at `slot`, replacing a previous binding.
    pub fn bind(mut self, slot: u32, buffer: &'a wgpu::Buffer) -> Self {
        self.buffers.retain(|(s, _)| *s != slot);
        self.buffers.push((slot, buffer));
        self
    }

    fn buffer(&self, slot: u32) -> Option<&'a wgpu::Buffer> {
        self.buffers.iter().find(|(s, _)| *s == slot).map(|(_, b)| *b)
    }
}

impl SlotWriter for QueueSlots<'_> {
    fn accepts(&self, slot: u32, len: usize) -> bool {
        self.buffer(slot).is_some_and(|b| len as u64 <= b.size())
    }

    fn write_slot(&mut self, slot: u32, bytes: &[u8]) -> bool {
        let Some(buffer) = self.buffer(slot) else {
            log::warn!("no buffer bound at slot {slot}");
            return false;
        };
        if bytes.len() as u64 > buffer.size() {
            log::warn!(
                "slot {slot}: {} bytes do not fit a {}-byte buffer",
                bytes.len(),
                buffer.size()
            );
            return false;
        }
        self.queue.write_buffer(buffer, 0, bytes);
        true
    }
}

/// Writes every `(slot, bytes)` pair, or none of them.
fn write_all(writer: &mut impl SlotWriter, writes: &[(u32, &[u8])]) -> DrawAction {
    if let Some((slot, bytes)) = writes.iter().find(|(s, b)| !writer.accepts(*s, b.len())) {
        log::warn!("slot {slot} cannot take {} bytes, skipping draw", bytes.len());
        return DrawAction::SkipFrame;
    }
    for (slot, bytes) in writes {
        if !writer.write_slot(*slot, bytes) {
            return DrawAction::SkipFrame;
        }
    }
    DrawAction::Submit
}

/// Mismatches degrade to a skipped draw; declaration errors propagate.
fn recover(result: Result<DrawAction, LayoutError>) -> Result<DrawAction, LayoutError> {
    match result {
        Err(e) if e.is_mismatch() => {
            log::warn!("skipping draw: {e}");
            Ok(DrawAction::SkipFrame)
        }
        other => other,
    }
}

/// Writes a uniforms record to the pairing's uniforms slot.
///
/// A record whose schema is not the pairing's is a mismatch: the draw is skipped and
/// nothing is written.
pub fn stage_uniforms(
    writer: &mut impl SlotWriter,
    pairing: &Pairing,
    uniforms: &Uniforms,
) -> Result<DrawAction, LayoutError> {
    recover(try_stage_uniforms(writer, pairing, uniforms))
}

fn try_stage_uniforms(
    writer: &mut impl SlotWriter,
    pairing: &Pairing,
    uniforms: &Uniforms,
) -> Result<DrawAction, LayoutError> {
    let table = pairing.validate()?;
    let slot = table.slot_for(BufferRole::Uniforms)?;
    if uniforms.version() != pairing.uniforms {
        return Err(LayoutError::mismatch(
            pairing.uniforms.name(),
            MismatchKind::Version {
                expected: pairing.uniforms.name(),
                actual: uniforms.version().name(),
            },
        ));
    }
    let bytes = uniforms.pack();
    Ok(write_all(writer, &[(slot, bytes.as_slice())]))
}

/// Writes already-packed uniforms bytes after checking them against the pairing.
pub fn stage_uniform_bytes(
    writer: &mut impl SlotWriter,
    pairing: &Pairing,
    bytes: &[u8],
) -> Result<DrawAction, LayoutError> {
    recover(try_stage_uniform_bytes(writer, pairing, bytes))
}

fn try_stage_uniform_bytes(
    writer: &mut impl SlotWriter,
    pairing: &Pairing,
    bytes: &[u8],
) -> Result<DrawAction, LayoutError> {
    let table = pairing.validate()?;
    let slot = table.slot_for(BufferRole::Uniforms)?;
    Uniforms::unpack(bytes, pairing.uniforms)?;
    Ok(write_all(writer, &[(slot, bytes)]))
}

/// Uploads a vertex array to the pairing's vertex slot(s).
///
/// The split build receives the array as two parallel streams.
pub fn stage_vertices(
    writer: &mut impl SlotWriter,
    pairing: &Pairing,
    vertices: &VertexArray,
) -> Result<DrawAction, LayoutError> {
    recover(try_stage_vertices(writer, pairing, vertices))
}

fn try_stage_vertices(
    writer: &mut impl SlotWriter,
    pairing: &Pairing,
    vertices: &VertexArray,
) -> Result<DrawAction, LayoutError> {
    let table = pairing.validate()?;
    if vertices.version() != pairing.vertex {
        return Err(LayoutError::mismatch(
            pairing.vertex.name(),
            MismatchKind::Version {
                expected: pairing.vertex.name(),
                actual: vertices.version().name(),
            },
        ));
    }

    match vertices {
        VertexArray::B(list) if pairing.build == BuildVariant::SplitMesh => {
            let (positions, colors) = MeshStreams::from_vertices(list).pack()?;
            Ok(write_all(
                writer,
                &[
                    (table.slot_for(BufferRole::MeshPositions)?, positions.as_slice()),
                    (table.slot_for(BufferRole::MeshColors)?, colors.as_slice()),
                ],
            ))
        }
        _ => {
            let slot = table.slot_for(BufferRole::Vertices)?;
            let bytes = vertices.pack();
            Ok(write_all(writer, &[(slot, bytes.as_slice())]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::{UniformsV2, UniformsV5, UniformsVersion};
    use crate::vertex::{VertexA, VertexB, VertexVersion};

    /// Records writes; only `bound` slots accept bytes.
    struct Recorder {
        bound: Vec<u32>,
        writes: Vec<(u32, Vec<u8>)>,
    }

    impl Recorder {
        fn with_slots(bound: &[u32]) -> Self {
            Self { bound: bound.to_vec(), writes: Vec::new() }
        }
    }

    impl SlotWriter for Recorder {
        fn accepts(&self, slot: u32, _len: usize) -> bool {
            self.bound.contains(&slot)
        }

        fn write_slot(&mut self, slot: u32, bytes: &[u8]) -> bool {
            if !self.accepts(slot, bytes.len()) {
                return false;
            }
            self.writes.push((slot, bytes.to_vec()));
            true
        }
    }

    fn v5_pairing() -> Pairing {
        Pairing::new(BuildVariant::Interleaved, UniformsVersion::V5, VertexVersion::A)
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn matching_uniforms_are_written_to_slot() {
        let mut w = Recorder::with_slots(&[0, 1]);
        let u = Uniforms::from(UniformsV5::default());
        assert_eq!(stage_uniforms(&mut w, &v5_pairing(), &u), Ok(DrawAction::Submit));
        assert_eq!(w.writes, vec![(1, u.pack())]);
    }

    #[test]
    fn foreign_uniforms_skip_the_frame() {
        let mut w = Recorder::with_slots(&[0, 1]);
        let u = Uniforms::from(UniformsV2::default());
        assert_eq!(stage_uniforms(&mut w, &v5_pairing(), &u), Ok(DrawAction::SkipFrame));
        assert!(w.writes.is_empty());
    }

    #[test]
    fn short_uniform_bytes_skip_the_frame() {
        let mut w = Recorder::with_slots(&[0, 1]);
        let bytes = Uniforms::from(UniformsV2::default()).pack();
        assert_eq!(stage_uniform_bytes(&mut w, &v5_pairing(), &bytes), Ok(DrawAction::SkipFrame));
        assert!(w.writes.is_empty());
    }

    #[test]
    fn split_build_writes_uniforms_to_slot_2() {
        let mut w = Recorder::with_slots(&[0, 1, 2]);
        let pairing = Pairing::new(BuildVariant::SplitMesh, UniformsVersion::V2, VertexVersion::B);
        let bytes = Uniforms::from(UniformsV2::default()).pack();
        assert_eq!(stage_uniform_bytes(&mut w, &pairing, &bytes), Ok(DrawAction::Submit));
        assert_eq!(w.writes[0].0, 2);
    }

    #[test]
    fn unbound_slot_skips_the_frame() {
        let mut w = Recorder::with_slots(&[]);
        let u = Uniforms::from(UniformsV5::default());
        assert_eq!(stage_uniforms(&mut w, &v5_pairing(), &u), Ok(DrawAction::SkipFrame));
    }

    #[test]
    fn version_mismatch_names_both_schemas() {
        let u = Uniforms::from(UniformsV2::default());
        let err = try_stage_uniforms(&mut Recorder::with_slots(&[1]), &v5_pairing(), &u).unwrap_err();
        assert_eq!(
            err,
            LayoutError::mismatch(
                "Uniforms V5",
                MismatchKind::Version { expected: "Uniforms V5", actual: "Uniforms V2" },
            )
        );
    }

    #[test]
    fn unsupported_pairing_is_an_error_not_a_skip() {
        let mut w = Recorder::with_slots(&[0, 1, 2]);
        let pairing = Pairing::new(BuildVariant::SplitMesh, UniformsVersion::V2, VertexVersion::A);
        let u = Uniforms::from(UniformsV2::default());
        assert_eq!(
            stage_uniforms(&mut w, &pairing, &u),
            Err(LayoutError::UnsupportedPairing {
                build: BuildVariant::SplitMesh,
                vertex: VertexVersion::A,
            })
        );
        let array = VertexArray::A(vec![VertexA::default(); 3]);
        assert!(stage_vertices(&mut w, &pairing, &array).is_err());
        assert!(w.writes.is_empty());
    }

    // ── vertices ──────────────────────────────────────────────────────────

    #[test]
    fn interleaved_vertices_go_to_slot_0() {
        let mut w = Recorder::with_slots(&[0, 1]);
        let array = VertexArray::A(vec![VertexA::default(); 3]);
        assert_eq!(stage_vertices(&mut w, &v5_pairing(), &array), Ok(DrawAction::Submit));
        assert_eq!(w.writes.len(), 1);
        assert_eq!(w.writes[0].0, 0);
        assert_eq!(w.writes[0].1.len(), 108);
    }

    #[test]
    fn split_vertices_go_to_parallel_slots() {
        let mut w = Recorder::with_slots(&[0, 1, 2]);
        let pairing = Pairing::new(BuildVariant::SplitMesh, UniformsVersion::V2, VertexVersion::B);
        let array = VertexArray::B(vec![
            VertexB::new([1.0, 2.0, 3.0], [0.1, 0.2, 0.3]),
            VertexB::new([4.0, 5.0, 6.0], [0.4, 0.5, 0.6]),
        ]);
        assert_eq!(stage_vertices(&mut w, &pairing, &array), Ok(DrawAction::Submit));

        let slots: Vec<_> = w.writes.iter().map(|(s, b)| (*s, b.len())).collect();
        assert_eq!(slots, vec![(0, 24), (1, 24)]);
        let colors: Vec<f32> = w.writes[1]
            .1
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(colors, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
    }

    #[test]
    fn split_vertices_are_written_all_or_nothing() {
        // Only the position stream has a buffer.
        let mut w = Recorder::with_slots(&[0]);
        let pairing = Pairing::new(BuildVariant::SplitMesh, UniformsVersion::V2, VertexVersion::B);
        let array = VertexArray::B(vec![VertexB::default(); 3]);
        assert_eq!(stage_vertices(&mut w, &pairing, &array), Ok(DrawAction::SkipFrame));
        assert!(w.writes.is_empty());
    }

    #[test]
    fn vertices_of_wrong_schema_skip_the_frame() {
        let mut w = Recorder::with_slots(&[0, 1]);
        let array = VertexArray::B(vec![VertexB::default(); 3]);
        assert_eq!(stage_vertices(&mut w, &v5_pairing(), &array), Ok(DrawAction::SkipFrame));
        assert!(w.writes.is_empty());
    }
}
