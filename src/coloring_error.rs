//! ColoringError: Unified error type for dist-coloring public APIs
//!
//! Every fallible operation in the crate (graph construction, transport,
//! distribution and the coloring protocol itself) reports through this enum.
//! Protocol failures are raised only after a collective agreement, so every
//! rank of a run observes the same variant.

use thiserror::Error;

use crate::graph::{Color, VertexId};

/// Unified error type for dist-coloring operations.
#[derive(Debug, Error)]
pub enum ColoringError {
    /// An edge endpoint or vertex lookup was outside `[0, vertex_count)`.
    #[error("vertex {vertex} out of range for a graph with {vertex_count} vertices")]
    VertexOutOfRange {
        vertex: usize,
        vertex_count: usize,
    },
    /// `add_edge(v, v)`; the neighbor relation is irreflexive.
    #[error("self-loop on vertex {0} is not allowed")]
    SelfLoop(VertexId),
    /// A full color vector did not match the vertex count.
    #[error("color vector has {got} entries, graph has {expected} vertices")]
    ColorCountMismatch { expected: usize, got: usize },
    /// Ranks disagree on the number of vertices being distributed.
    #[error("graph has {got} vertices, expected {expected}")]
    VertexCountMismatch { expected: usize, got: usize },
    /// A flat edge list had an odd number of entries.
    #[error("flat edge list must hold (u, v) pairs, got {0} entries")]
    MalformedEdgeList(usize),
    /// Palette must contain at least one color.
    #[error("palette size must be at least 1, got {0}")]
    InvalidPalette(Color),
    /// Communicator reported a rank outside `[0, size)`.
    #[error("rank {rank} is not valid in a world of size {size}")]
    InvalidRank { rank: usize, size: usize },
    /// The distribution root was not handed a graph to broadcast.
    #[error("root rank {root} has no graph to distribute")]
    MissingRootGraph { root: usize },

    /// Some vertex had no free color in `1..=palette_size`.
    #[error("not enough colors: palette of {palette_size} exhausted in round {round}")]
    PaletteExhausted { palette_size: Color, round: usize },
    /// A randomized round colored nothing while vertices were still uncolored.
    #[error("coloring stalled in round {round} with {uncolored} vertices uncolored")]
    Stalled { round: usize, uncolored: usize },
    /// The configured round cap was reached before convergence.
    #[error("coloring did not converge within {rounds} rounds")]
    RoundLimitExceeded { rounds: usize },

    /// Communication failure with a peer rank.
    #[error("communication error with rank {neighbor}: {source}")]
    CommError {
        neighbor: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A received buffer had the wrong size.
    #[error("buffer size mismatch from rank {neighbor}: expected {expected} bytes, got {got}")]
    BufferSizeMismatch {
        neighbor: usize,
        expected: usize,
        got: usize,
    },
    /// MPI could not be initialized (already initialized, or no runtime).
    #[error("MPI initialization failed")]
    MpiInit,
}

impl ColoringError {
    /// True for the failures the protocol detects collectively.
    pub fn is_protocol_failure(&self) -> bool {
        matches!(
            self,
            ColoringError::PaletteExhausted { .. }
                | ColoringError::Stalled { .. }
                | ColoringError::RoundLimitExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let e = ColoringError::PaletteExhausted {
            palette_size: 2,
            round: 3,
        };
        assert_eq!(
            e.to_string(),
            "not enough colors: palette of 2 exhausted in round 3"
        );
        assert!(e.is_protocol_failure());
        assert!(!ColoringError::SelfLoop(4).is_protocol_failure());
    }

    #[test]
    fn vertex_count_mismatch_names_both_sizes() {
        let e = ColoringError::VertexCountMismatch {
            expected: 4,
            got: 6,
        };
        assert_eq!(e.to_string(), "graph has 6 vertices, expected 4");
        assert!(!e.is_protocol_failure());
    }

    #[test]
    fn comm_error_keeps_source() {
        let e = ColoringError::CommError {
            neighbor: 1,
            source: "no data".into(),
        };
        assert!(std::error::Error::source(&e).is_some());
        assert!(e.to_string().contains("rank 1"));
    }
}
