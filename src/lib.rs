#![cfg_attr(docsrs, feature(doc_cfg))]
//! # dist-coloring
//!
//! dist-coloring computes a proper vertex coloring of an undirected graph
//! cooperatively across a fixed set of ranks that share no memory and talk only
//! through collectives (broadcast, variable-length all-gather, all-reduce).
//!
//! ## Features
//! - Replicated [`Graph`](graph::Graph) view with flat edge-list serialization and dot rendering
//! - Contiguous vertex partitioning, computed independently on every rank
//! - Pluggable communication backends (single rank, in-process threads, MPI)
//! - Two interchangeable protocols: randomized (Luby-style independent sets) and turn-based
//! - Collective failure agreement: palette exhaustion and stalls abort every rank together
//! - A shared-memory backtracking solver for small exact instances
//!
//! ## Determinism
//!
//! Random graphs and protocol priorities use `SmallRng`. Pass a seed through
//! [`ColoringConfig`](algs::coloring::ColoringConfig) for reproducible runs;
//! unit tests fix seeds explicitly.
//!
//! ## Usage
//!
//! ```rust
//! use dist_coloring::prelude::*;
//!
//! let mut g = Graph::from_edges(4, &[(0, 1), (0, 2), (1, 2), (1, 3), (2, 3)]).unwrap();
//! let stats = color(&mut g, &NoComm, 3).unwrap();
//! assert!(g.is_properly_colored());
//! assert!(stats.rounds >= 3);
//! ```
//!
//! Multi-rank runs move one [`ThreadComm`](algs::communicator::ThreadComm) per
//! thread, or use `MpiComm` with the `mpi-support` feature.

pub mod algs;
pub mod coloring_error;
pub mod graph;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::backtrack::color_exhaustive;
    pub use crate::algs::coloring::{ColoringConfig, ColoringStats, Strategy, color, color_with};
    pub use crate::algs::communicator::{Communicator, NoComm, ThreadComm, Wait};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::distribute::distribute_graph;
    pub use crate::algs::partition::{VertexPartition, partition};
    pub use crate::coloring_error::ColoringError;
    pub use crate::graph::{Color, ColoringViolation, Graph, Node, UNCOLORED, VertexId};
}
