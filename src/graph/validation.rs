//! Post-hoc coloring checks. Not part of convergence; drivers and tests call
//! these after the protocol has returned.

use hashbrown::HashSet;
use rayon::prelude::*;
use thiserror::Error;

use super::{Color, Graph, UNCOLORED, VertexId};

/// First problem found in a coloring (lowest vertex id wins).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ColoringViolation {
    #[error("vertex {vertex} is not colored")]
    Uncolored { vertex: VertexId },
    #[error("adjacent vertices {u} and {v} share color {color}")]
    Conflict {
        u: VertexId,
        v: VertexId,
        color: Color,
    },
}

impl Graph {
    /// Check that every vertex is colored and no edge is monochromatic.
    pub fn validate_coloring(&self) -> Result<(), ColoringViolation> {
        let nodes = self.nodes();
        let found = nodes.par_iter().find_map_first(|node| {
            if !node.is_colored() {
                return Some(ColoringViolation::Uncolored { vertex: node.id() });
            }
            node.neighbors()
                .find(|&v| nodes[v].color() == node.color())
                .map(|v| ColoringViolation::Conflict {
                    u: node.id(),
                    v,
                    color: node.color(),
                })
        });
        match found {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }

    #[inline]
    pub fn is_properly_colored(&self) -> bool {
        self.validate_coloring().is_ok()
    }

    /// Number of distinct non-zero colors in use.
    pub fn distinct_colors(&self) -> usize {
        self.nodes()
            .iter()
            .map(|n| n.color())
            .filter(|&c| c != UNCOLORED)
            .collect::<HashSet<_>>()
            .len()
    }
}
