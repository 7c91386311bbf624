//! Turn-based protocol: ranks recolor their own block one at a time.
//!
//! A round is `world_size` turns in rank order. On turn `r` only rank `r`
//! writes: it first-fit colors its uncolored vertices against the colors it
//! currently knows, and recolors any owned vertex whose color clashes with a
//! neighbor. Then, on every rank:
//! 1. the owner's exhaustion flag is OR-reduced (before any broadcast, so a
//!    failing owner never leaves peers stuck in a broadcast);
//! 2. the owner broadcasts its full color vector, which replaces every other
//!    replica;
//! 3. the owner's "changed" flag is OR-reduced.
//!
//! The run converges after a round in which no turn changed anything.

use super::{ColoringConfig, ColoringStats, RankContext, Strategy};
use super::{check_round_limit, first_free_color, has_conflict};
use crate::algs::collective::broadcast_slice;
use crate::algs::communicator::Communicator;
use crate::coloring_error::ColoringError;
use crate::graph::{Color, Graph, UNCOLORED, VertexId};

/// What the turn owner did to its block.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TurnOutcome {
    pub changed: usize,
    pub exhausted: Option<VertexId>,
}

pub(crate) fn color_turn_based<C: Communicator>(
    graph: &mut Graph,
    comm: &C,
    cfg: &ColoringConfig,
    ctx: &RankContext,
) -> Result<ColoringStats, ColoringError> {
    let world_size = ctx.layout.world_size();
    let mut stats = ColoringStats::new(Strategy::TurnBased);
    let mut round = 0usize;

    loop {
        round += 1;
        check_round_limit(cfg, round)?;
        let mut round_changed = false;

        for turn in 0..world_size {
            let mut colors = graph.colors();
            let outcome = if turn == ctx.rank {
                recolor_block(graph, &mut colors, ctx.owned.clone(), cfg.palette_size)
            } else {
                TurnOutcome::default()
            };

            if let Some(v) = outcome.exhausted {
                log::error!(
                    "[rank {}] vertex {v} has no free color among {} (round {round})",
                    ctx.rank,
                    cfg.palette_size
                );
            }
            if comm.all_reduce_or(outcome.exhausted.is_some())? {
                return Err(ColoringError::PaletteExhausted {
                    palette_size: cfg.palette_size,
                    round,
                });
            }

            broadcast_slice(comm, turn, &mut colors)?;
            graph.set_colors(&colors)?;

            if comm.all_reduce_or(outcome.changed > 0)? {
                round_changed = true;
            }
            log::debug!(
                "[rank {}] round {round} turn {turn}: {} local changes",
                ctx.rank,
                outcome.changed
            );
        }

        stats.record_round(graph.uncolored_count());
        if !round_changed {
            return Ok(stats);
        }
    }
}

/// First-fit the owner's block in vertex order, writing into `colors`.
///
/// Settled vertices keep their color unless it clashes with a neighbor.
/// Stops at the first vertex with no free color.
pub fn recolor_block(
    graph: &Graph,
    colors: &mut [Color],
    owned: impl Iterator<Item = VertexId>,
    palette_size: Color,
) -> TurnOutcome {
    let mut outcome = TurnOutcome::default();
    for v in owned {
        if colors[v] != UNCOLORED && !has_conflict(graph, colors, v) {
            continue;
        }
        let current = colors[v];
        colors[v] = UNCOLORED;
        match first_free_color(graph, colors, v, palette_size) {
            Some(c) => {
                colors[v] = c;
                if c != current {
                    outcome.changed += 1;
                }
            }
            None => {
                colors[v] = current;
                outcome.exhausted = Some(v);
                break;
            }
        }
    }
    outcome
}
