//! Re-export public algorithms.

pub mod backtrack;
pub mod collective;
pub mod coloring;
pub mod communicator;
pub mod distribute;
pub mod partition;

pub use coloring::{ColoringConfig, ColoringStats, Strategy, color, color_with};
pub use distribute::distribute_graph;
pub use partition::{VertexPartition, partition};
