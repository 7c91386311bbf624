#![allow(dead_code)]
use dist_coloring::{
    algs::communicator::ThreadComm,
    graph::{Color, Graph},
};

/// Build a graph from undirected pairs.
pub fn graph_from(n: usize, edges: &[(usize, usize)]) -> Graph {
    Graph::from_edges(n, edges).expect("valid edge list")
}

/// The four-vertex example: two triangles sharing edge 1-2.
pub fn diamond() -> Graph {
    graph_from(4, &[(0, 1), (0, 2), (1, 2), (1, 3), (2, 3)])
}

/// Run `body` once per rank of a fresh `size`-rank world, each on its own
/// thread, and return the per-rank results in rank order.
pub fn run_world<T, F>(size: usize, body: F) -> Vec<T>
where
    T: Send,
    F: Fn(&ThreadComm) -> T + Sync,
{
    let world = ThreadComm::world(size);
    std::thread::scope(|s| {
        let handles: Vec<_> = world
            .iter()
            .map(|comm| {
                let body = &body;
                s.spawn(move || body(comm))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread panicked"))
            .collect()
    })
}

/// Assert every vertex is colored, within the palette, and no edge is monochromatic.
pub fn assert_proper(g: &Graph, colors: &[Color], palette: Color) {
    assert_eq!(colors.len(), g.vertex_count());
    for (v, &c) in colors.iter().enumerate() {
        assert!(c >= 1 && c <= palette, "vertex {v} has color {c}");
    }
    for (u, v) in g.edges() {
        assert_ne!(colors[u], colors[v], "edge {u}-{v} shares color {}", colors[u]);
    }
}

/// Assert all replicas ended bit-for-bit identical and return the shared vector.
pub fn assert_converged(replicas: &[Vec<Color>]) -> Vec<Color> {
    let first = replicas.first().expect("at least one rank").clone();
    for (rank, r) in replicas.iter().enumerate() {
        assert_eq!(r, &first, "rank {rank} diverged");
    }
    first
}
