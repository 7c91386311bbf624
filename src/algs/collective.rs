//! Typed collectives over the byte-level [`Communicator`] API.
//!
//! Element types must be `bytemuck::Pod`; buffers are cast in place, never
//! re-encoded, so the wire layout is the native little-endian layout of `T`.

use bytemuck::{Pod, cast_slice, cast_slice_mut};

use crate::algs::communicator::Communicator;
use crate::algs::partition::VertexPartition;
use crate::coloring_error::ColoringError;
use crate::graph::Color;

static_assertions::const_assert_eq!(std::mem::size_of::<Color>(), 4);

/// Broadcast a typed slice from `root` to every rank, in place.
pub fn broadcast_slice<T: Pod, C: Communicator + ?Sized>(
    comm: &C,
    root: usize,
    data: &mut [T],
) -> Result<(), ColoringError> {
    comm.broadcast_bytes(root, cast_slice_mut(data))
}

/// All-gather the calling rank's block of a vertex-indexed vector.
///
/// `local.len()` must equal the rank's count in `layout`; the result has one
/// entry per vertex, blocks concatenated in rank order.
pub fn all_gather_varcount<T: Pod, C: Communicator + ?Sized>(
    comm: &C,
    local: &[T],
    layout: &VertexPartition,
) -> Result<Vec<T>, ColoringError> {
    let width = std::mem::size_of::<T>();
    let byte_counts: Vec<usize> = layout.counts().iter().map(|&c| c * width).collect();
    let raw = comm.all_gather_bytes(cast_slice(local), &byte_counts)?;

    let mut out = vec![T::zeroed(); layout.vertex_count()];
    let dst = cast_slice_mut::<T, u8>(&mut out);
    if dst.len() != raw.len() {
        return Err(ColoringError::BufferSizeMismatch {
            neighbor: comm.rank(),
            expected: dst.len(),
            got: raw.len(),
        });
    }
    dst.copy_from_slice(&raw);
    Ok(out)
}
