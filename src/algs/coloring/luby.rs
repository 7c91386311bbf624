//! Randomized protocol: a distributed Luby maximal-independent-set step per round.
//!
//! Round structure (every step after "propose" is separated by a collective):
//! 1. each rank draws a priority in `[0, 1)` for its uncolored vertices
//!    ([`NOT_CANDIDATE`] for everything else);
//! 2. priorities are all-gathered, so every rank sees the full vector;
//! 3. an uncolored owned vertex wins if it beats every uncolored neighbor,
//!    ties going to the lower id;
//! 4. winners take the first free color against the round's snapshot;
//! 5. palette exhaustion is OR-reduced, then colors are all-gathered and
//!    replace the local replica;
//! 6. winner counts are summed; a zero sum with work left is a stall.
//!
//! Winners form an independent set, so two winners never read each other's
//! color and the snapshot taken at the start of the round stays valid.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{ColoringConfig, ColoringStats, RankContext, Strategy};
use super::{check_round_limit, first_free_color, seed_for_rank};
use crate::algs::collective::all_gather_varcount;
use crate::algs::communicator::Communicator;
use crate::coloring_error::ColoringError;
use crate::graph::{Color, Graph, UNCOLORED, VertexId};

/// Priority of a vertex that does not take part in the round.
pub const NOT_CANDIDATE: f64 = -1.0;

pub(crate) fn color_randomized<C: Communicator>(
    graph: &mut Graph,
    comm: &C,
    cfg: &ColoringConfig,
    ctx: &RankContext,
) -> Result<ColoringStats, ColoringError> {
    let mut rng = SmallRng::seed_from_u64(seed_for_rank(cfg.seed, ctx.rank));
    let mut stats = ColoringStats::new(Strategy::Randomized);
    let mut uncolored = graph.uncolored_count();
    let mut round = 0usize;

    while uncolored > 0 {
        round += 1;
        check_round_limit(cfg, round)?;
        let colors = graph.colors();

        // propose
        let local_priorities: Vec<f64> = ctx
            .owned
            .clone()
            .map(|v| {
                if colors[v] == UNCOLORED {
                    rng.gen_range(0.0..1.0)
                } else {
                    NOT_CANDIDATE
                }
            })
            .collect();
        let priorities = all_gather_varcount(comm, &local_priorities, &ctx.layout)?;

        // decide + color
        let winners = select_winners(graph, &colors, &priorities, ctx.owned.clone());
        let mut exhausted = false;
        let mut next = colors.clone();
        for &v in &winners {
            match first_free_color(graph, &colors, v, cfg.palette_size) {
                Some(c) => next[v] = c,
                None => {
                    log::error!(
                        "[rank {}] vertex {v} has no free color among {} (round {round})",
                        ctx.rank,
                        cfg.palette_size
                    );
                    exhausted = true;
                }
            }
        }
        if comm.all_reduce_or(exhausted)? {
            return Err(ColoringError::PaletteExhausted {
                palette_size: cfg.palette_size,
                round,
            });
        }

        // reconcile replicas
        let synced = all_gather_varcount(comm, &next[ctx.owned.clone()], &ctx.layout)?;
        graph.set_colors(&synced)?;

        let colored = comm.all_reduce_sum(winners.len() as u64)? as usize;
        if colored == 0 {
            return Err(ColoringError::Stalled { round, uncolored });
        }
        uncolored = uncolored.saturating_sub(colored);
        stats.record_round(uncolored);
        log::debug!(
            "[rank {}] round {round}: {} local winners, {colored} colored, {uncolored} left",
            ctx.rank,
            winners.len()
        );
    }
    Ok(stats)
}

/// Uncolored vertices in `owned` whose priority beats every uncolored neighbor.
///
/// `priorities` covers all vertices, so the same rule evaluated on any rank
/// gives the same answer for a vertex; ties break toward the lower id.
pub fn select_winners(
    graph: &Graph,
    colors: &[Color],
    priorities: &[f64],
    owned: impl Iterator<Item = VertexId>,
) -> Vec<VertexId> {
    owned
        .filter(|&v| colors[v] == UNCOLORED)
        .filter(|&v| {
            let mine = priorities[v];
            graph.nodes()[v]
                .neighbors()
                .filter(|&u| colors[u] == UNCOLORED)
                .all(|u| beats(mine, v, priorities[u], u))
        })
        .collect()
}

#[inline]
fn beats(p_v: f64, v: VertexId, p_u: f64, u: VertexId) -> bool {
    p_v > p_u || (p_v == p_u && v < u)
}
