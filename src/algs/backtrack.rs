//! Exact k-coloring by backtracking, shared-memory parallel.
//!
//! Vertices are decided in id order; a color is safe for `v` if no
//! lower-numbered neighbor already holds it. The choice for vertex 0 is fanned
//! out across rayon tasks. All tasks share one "solved" flag and one
//! mutex-guarded slot for the winning assignment: the first complete
//! assignment wins, and every task checks the flag before and after each
//! descent so the others stop promptly.
//!
//! Exponential in the worst case; meant for small graphs and for checking
//! whether a palette is feasible at all.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::graph::{Color, Graph, UNCOLORED, VertexId};

struct Search<'g> {
    graph: &'g Graph,
    palette_size: Color,
    solved: AtomicBool,
    solution: Mutex<Option<Vec<Color>>>,
}

impl Search<'_> {
    fn is_safe(&self, v: VertexId, c: Color, colors: &[Color]) -> bool {
        self.graph.nodes()[v]
            .neighbors()
            .take_while(|&u| u < v)
            .all(|u| colors[u] != c)
    }

    fn descend(&self, v: VertexId, colors: &mut Vec<Color>) {
        if self.solved.load(Ordering::Acquire) {
            return;
        }
        if v == self.graph.vertex_count() {
            let mut slot = self.solution.lock();
            if !self.solved.load(Ordering::Acquire) {
                *slot = Some(colors.clone());
                self.solved.store(true, Ordering::Release);
            }
            return;
        }
        for c in 1..=self.palette_size {
            if self.is_safe(v, c, colors) {
                colors[v] = c;
                self.descend(v + 1, colors);
                colors[v] = UNCOLORED;
                if self.solved.load(Ordering::Acquire) {
                    return;
                }
            }
        }
    }
}

/// Find some proper coloring with colors `1..=palette_size`, or `None` if none exists.
pub fn color_exhaustive(graph: &Graph, palette_size: Color) -> Option<Vec<Color>> {
    let n = graph.vertex_count();
    if n == 0 {
        return Some(Vec::new());
    }
    let search = Search {
        graph,
        palette_size,
        solved: AtomicBool::new(false),
        solution: Mutex::new(None),
    };

    (1..=palette_size).into_par_iter().for_each(|first| {
        let mut colors = vec![UNCOLORED; n];
        colors[0] = first;
        search.descend(1, &mut colors);
    });

    search.solution.into_inner()
}
