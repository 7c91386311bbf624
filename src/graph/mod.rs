//! Replicated graph view: vertices, adjacency and per-vertex colors.
//!
//! Every rank holds a structurally identical [`Graph`]. The coloring protocols
//! only ever mutate colors; adjacency is fixed once edges have been inserted.

pub mod io;
pub mod validation;

use std::collections::BTreeSet;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::coloring_error::ColoringError;

pub use validation::ColoringViolation;

/// Dense vertex identifier in `[0, n)`.
pub type VertexId = usize;

/// Palette index; `0` is [`UNCOLORED`], `1..=palette_size` are real colors.
pub type Color = u32;

/// Sentinel color of a vertex that has not been decided yet.
pub const UNCOLORED: Color = 0;

/// A single vertex: its id, current color and (ordered) neighbor set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    id: VertexId,
    color: Color,
    neighbors: BTreeSet<VertexId>,
}

impl Node {
    fn new(id: VertexId) -> Self {
        Self {
            id,
            color: UNCOLORED,
            neighbors: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> VertexId {
        self.id
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub fn is_colored(&self) -> bool {
        self.color != UNCOLORED
    }

    /// Neighbor ids in increasing order.
    pub fn neighbors(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.neighbors.iter().copied()
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn is_adjacent(&self, other: VertexId) -> bool {
        self.neighbors.contains(&other)
    }
}

/// Fixed-size undirected graph with per-vertex colors.
///
/// The neighbor relation is kept symmetric and irreflexive by [`Graph::add_edge`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    /// `vertex_count` uncolored vertices and no edges.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            nodes: (0..vertex_count).map(Node::new).collect(),
        }
    }

    /// Erdős–Rényi graph: each pair `i < j` is joined with probability `density`.
    ///
    /// `density` is clamped to `[0, 1]` (NaN counts as `0`). `seed = None` draws
    /// the generator from OS entropy, so two calls give different graphs.
    pub fn random(vertex_count: usize, density: f64, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_entropy(),
        };
        let density = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };

        let mut g = Graph::new(vertex_count);
        for i in 0..vertex_count {
            for j in (i + 1)..vertex_count {
                if rng.gen_range(0.0..1.0) < density {
                    g.nodes[i].neighbors.insert(j);
                    g.nodes[j].neighbors.insert(i);
                }
            }
        }
        g
    }

    /// Build a graph from explicit `(u, v)` pairs.
    pub fn from_edges(vertex_count: usize, edges: &[(VertexId, VertexId)]) -> Result<Self, ColoringError> {
        let mut g = Graph::new(vertex_count);
        for &(u, v) in edges {
            g.add_edge(u, v)?;
        }
        Ok(g)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(Node::degree).sum::<usize>() / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert the undirected edge `{u, v}`. Inserting an existing edge is a no-op.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId) -> Result<(), ColoringError> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;
        if u == v {
            return Err(ColoringError::SelfLoop(u));
        }
        self.nodes[u].neighbors.insert(v);
        self.nodes[v].neighbors.insert(u);
        Ok(())
    }

    pub fn node(&self, id: VertexId) -> Result<&Node, ColoringError> {
        self.check_vertex(id)?;
        Ok(&self.nodes[id])
    }

    pub fn node_mut(&mut self, id: VertexId) -> Result<&mut Node, ColoringError> {
        self.check_vertex(id)?;
        Ok(&mut self.nodes[id])
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Snapshot of all colors, indexed by vertex id.
    pub fn colors(&self) -> Vec<Color> {
        self.nodes.iter().map(Node::color).collect()
    }

    /// Replace every color at once; `colors.len()` must equal the vertex count.
    pub fn set_colors(&mut self, colors: &[Color]) -> Result<(), ColoringError> {
        if colors.len() != self.nodes.len() {
            return Err(ColoringError::ColorCountMismatch {
                expected: self.nodes.len(),
                got: colors.len(),
            });
        }
        for (node, &c) in self.nodes.iter_mut().zip(colors) {
            node.color = c;
        }
        Ok(())
    }

    pub fn uncolored_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_colored()).count()
    }

    /// Every undirected edge once, as `(u, v)` with `u < v`, ordered by `u` then `v`.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.nodes.iter().flat_map(|node| {
            let u = node.id;
            node.neighbors
                .range((u + 1)..)
                .map(move |&v| (u, v))
        })
    }

    pub fn max_degree(&self) -> usize {
        self.nodes.iter().map(Node::degree).max().unwrap_or(0)
    }

    #[inline]
    fn check_vertex(&self, v: VertexId) -> Result<(), ColoringError> {
        if v < self.nodes.len() {
            Ok(())
        } else {
            Err(ColoringError::VertexOutOfRange {
                vertex: v,
                vertex_count: self.nodes.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_is_symmetric_and_idempotent() {
        let mut g = Graph::new(3);
        g.add_edge(0, 2).unwrap();
        g.add_edge(2, 0).unwrap();
        g.add_edge(0, 2).unwrap();
        assert_eq!(g.edge_count(), 1);
        assert!(g.node(0).unwrap().is_adjacent(2));
        assert!(g.node(2).unwrap().is_adjacent(0));
        assert_eq!(g.edges().collect::<Vec<_>>(), vec![(0, 2)]);
    }

    #[test]
    fn add_edge_rejects_bad_input() {
        let mut g = Graph::new(2);
        assert!(matches!(
            g.add_edge(0, 5),
            Err(ColoringError::VertexOutOfRange { vertex: 5, vertex_count: 2 })
        ));
        assert!(matches!(g.add_edge(1, 1), Err(ColoringError::SelfLoop(1))));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn set_colors_requires_full_vector() {
        let mut g = Graph::new(3);
        g.set_colors(&[1, 2, 3]).unwrap();
        assert_eq!(g.colors(), vec![1, 2, 3]);
        assert!(matches!(
            g.set_colors(&[1, 2]),
            Err(ColoringError::ColorCountMismatch { expected: 3, got: 2 })
        ));
        // untouched on error
        assert_eq!(g.colors(), vec![1, 2, 3]);
        g.set_colors(&[UNCOLORED; 3]).unwrap();
        assert_eq!(g.uncolored_count(), 3);
    }

    #[test]
    fn random_density_extremes() {
        let empty = Graph::random(6, -0.5, Some(1));
        assert_eq!(empty.edge_count(), 0);
        let complete = Graph::random(6, 7.0, Some(1));
        assert_eq!(complete.edge_count(), 15);
        let nan = Graph::random(6, f64::NAN, Some(1));
        assert_eq!(nan.edge_count(), 0);
    }

    #[test]
    fn random_is_reproducible_with_seed() {
        let a = Graph::random(40, 0.3, Some(7));
        let b = Graph::random(40, 0.3, Some(7));
        assert_eq!(a, b);
        assert!(a.edges().all(|(u, v)| u < v));
    }

    #[test]
    fn node_lookup_out_of_range() {
        let mut g = Graph::new(1);
        assert!(g.node(1).is_err());
        g.node_mut(0).unwrap().set_color(4);
        assert_eq!(g.node(0).unwrap().color(), 4);
    }
}
