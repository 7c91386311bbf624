// src/algs/distribute.rs

//! Replicate a graph from one root rank onto every rank of the world.

use crate::algs::collective::broadcast_slice;
use crate::algs::communicator::Communicator;
use crate::coloring_error::ColoringError;
use crate::graph::Graph;

/// Distribute the root's graph so that every rank holds an identical copy.
///
/// # Arguments
/// - `comm`: your communicator (threads or MPI)
/// - `root`: the rank holding the source graph
/// - `graph`: `Some(&g)` on the root; ignored elsewhere
/// - `vertex_count`: agreed number of vertices (known on every rank)
///
/// # Returns
/// A fresh, uncolored [`Graph`] with the root's adjacency.
///
/// The root first broadcasts a `[vertex_count, edge_list_len]` header taken
/// from its graph, then the list itself. A root without a graph, or any rank
/// whose `vertex_count` disagrees with the root graph (the root included), is
/// detected collectively before the edge list moves. Every rank then fails with
/// the same error instead of blocking in a broadcast or returning a graph of a
/// different size.
pub fn distribute_graph<C>(
    comm: &C,
    root: usize,
    graph: Option<&Graph>,
    vertex_count: usize,
) -> Result<Graph, ColoringError>
where
    C: Communicator,
{
    if root >= comm.size() {
        return Err(ColoringError::InvalidRank {
            rank: root,
            size: comm.size(),
        });
    }
    let is_root = comm.rank() == root;
    let source = graph.filter(|_| is_root);

    // 1) agree that the root actually has something to send
    if comm.all_reduce_or(is_root && source.is_none())? {
        return Err(ColoringError::MissingRootGraph { root });
    }

    // 2) header: the root graph's vertex count and edge-list length
    let mut flat = source.map(Graph::serialize).unwrap_or_default();
    let root_vertices = source.map_or(vertex_count, Graph::vertex_count);
    let mut header = [root_vertices as u64, flat.len() as u64];
    broadcast_slice(comm, root, &mut header)?;
    let root_count = header[0];

    // every rank learns every rank's count, so all of them report the same mismatch
    let width = std::mem::size_of::<u64>();
    let mine = vertex_count as u64;
    let counts = vec![width; comm.size()];
    let everyone = comm.all_gather_bytes(bytemuck::bytes_of(&mine), &counts)?;
    if let Some(got) = everyone
        .chunks_exact(width)
        .map(bytemuck::pod_read_unaligned::<u64>)
        .find(|&n| n != root_count)
    {
        return Err(ColoringError::VertexCountMismatch {
            expected: root_count as usize,
            got: got as usize,
        });
    }

    // 3) the edge list
    if !is_root {
        flat = vec![0u32; header[1] as usize];
    }
    broadcast_slice(comm, root, &mut flat)?;

    log::debug!(
        "[rank {}] received graph: {} vertices, {} edges",
        comm.rank(),
        vertex_count,
        flat.len() / 2
    );

    Graph::deserialize(vertex_count, &flat)
}
