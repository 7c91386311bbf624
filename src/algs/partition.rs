//! Contiguous block partitioning of vertex ids across ranks.
//!
//! Every rank but the last owns `n / world_size` vertices; the last rank
//! absorbs the remainder. The layout is a pure function of `(n, world_size)`,
//! so all ranks compute it independently without communicating.

use std::ops::Range;

use crate::coloring_error::ColoringError;
use crate::graph::VertexId;

/// Per-rank `(count, offset)` layout of `[0, n)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexPartition {
    counts: Vec<usize>,
    offsets: Vec<usize>,
}

/// Split `n_vertices` into `world_size` contiguous half-open ranges.
///
/// `n_vertices < world_size` is allowed: the leading ranks then own nothing and
/// the last rank owns everything.
pub fn partition(n_vertices: usize, world_size: usize) -> Result<VertexPartition, ColoringError> {
    if world_size == 0 {
        return Err(ColoringError::InvalidRank { rank: 0, size: 0 });
    }
    let base = n_vertices / world_size;
    let mut counts = Vec::with_capacity(world_size);
    let mut offsets = Vec::with_capacity(world_size);
    for rank in 0..world_size {
        let start = rank * base;
        let end = if rank == world_size - 1 {
            n_vertices
        } else {
            start + base
        };
        counts.push(end - start);
        offsets.push(start);
    }
    Ok(VertexPartition { counts, offsets })
}

impl VertexPartition {
    #[inline]
    pub fn world_size(&self) -> usize {
        self.counts.len()
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn vertex_count(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Vertices owned by `rank`. Panics if `rank >= world_size`.
    #[inline]
    pub fn range(&self, rank: usize) -> Range<VertexId> {
        self.offsets[rank]..self.offsets[rank] + self.counts[rank]
    }

    /// Rank owning `v`, if `v < n`.
    pub fn owner(&self, v: VertexId) -> Option<usize> {
        if v >= self.vertex_count() {
            return None;
        }
        // offsets are non-decreasing; empty leading ranks share offset 0
        let idx = self.offsets.partition_point(|&o| o <= v);
        (0..idx).rev().find(|&r| self.range(r).contains(&v))
    }
}
