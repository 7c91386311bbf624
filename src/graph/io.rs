//! Flat edge-list (de)serialization and dot-style text rendering.
//!
//! The flat format is what travels over the wire during distribution:
//! `[u0, v0, u1, v1, ...]` with `u < v`, each undirected edge exactly once.

use std::fmt;

use itertools::Itertools;

use super::{Graph, VertexId};
use crate::coloring_error::ColoringError;

impl Graph {
    /// Flatten the edge set to `[u0, v0, u1, v1, ...]` (`u < v`, sorted).
    pub fn serialize(&self) -> Vec<u32> {
        let mut flat = Vec::with_capacity(2 * self.edge_count());
        for (u, v) in self.edges() {
            flat.push(u as u32);
            flat.push(v as u32);
        }
        flat
    }

    /// Rebuild a graph from [`Graph::serialize`] output. All vertices start uncolored.
    pub fn deserialize(vertex_count: usize, flat: &[u32]) -> Result<Graph, ColoringError> {
        if flat.len() % 2 != 0 {
            return Err(ColoringError::MalformedEdgeList(flat.len()));
        }
        let mut g = Graph::new(vertex_count);
        for (u, v) in flat.iter().copied().tuples() {
            g.add_edge(u as VertexId, v as VertexId)?;
        }
        Ok(g)
    }

    /// Render in the `graph { ... }` text format (see [`fmt::Display`]).
    pub fn to_dot(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "graph {{")?;
        for node in self.nodes() {
            writeln!(f, "  {} [color={}];", node.id(), node.color())?;
        }
        for (u, v) in self.edges() {
            writeln!(f, "  {u} -- {v};")?;
        }
        writeln!(f, "}}")
    }
}
