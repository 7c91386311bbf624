//! Distributed vertex coloring over a replicated [`Graph`].
//!
//! Every rank owns a contiguous block of vertices (see [`partition`]) and
//! holds a full copy of the graph. Rounds of local decisions are interleaved
//! with collectives that reconcile the replicas, until every vertex carries a
//! color in `1..=palette_size` or the world agrees that it cannot.
//!
//! Two protocols implement the same contract:
//! - [`Strategy::Randomized`]: Luby-style independent sets chosen from random
//!   priorities, all ranks working concurrently ([`luby`]).
//! - [`Strategy::TurnBased`]: ranks recolor their block one at a time, in rank
//!   order, broadcasting after each turn ([`turns`]).
//!
//! ## Failure agreement
//!
//! A rank never returns early on a local problem. Local failure flags are
//! OR-reduced first, so every rank issues the same sequence of collectives and
//! returns the same error from the same round.
//!
//! ## Determinism
//!
//! With `seed = Some(s)` the randomized protocol is reproducible for a fixed
//! world size; each rank derives its own generator from `s` and its rank.
//! With `seed = None` wall-clock time is mixed in instead.

pub mod luby;
pub mod turns;

use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::algs::communicator::Communicator;
use crate::algs::partition::{VertexPartition, partition};
use crate::coloring_error::ColoringError;
use crate::graph::{Color, Graph, UNCOLORED, VertexId};

/// Which protocol [`color_with`] runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Strategy {
    #[default]
    Randomized,
    TurnBased,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Randomized => f.write_str("randomized"),
            Strategy::TurnBased => f.write_str("turns"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "randomized" | "random" | "luby" => Ok(Strategy::Randomized),
            "turns" | "turn-based" | "turn_based" => Ok(Strategy::TurnBased),
            other => Err(format!(
                "unknown strategy `{other}` (expected `randomized` or `turns`)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColoringConfig {
    /// Colors `1..=palette_size` may be used.
    pub palette_size: Color,
    pub strategy: Strategy,
    /// `None`: seed from wall-clock time (runs differ).
    pub seed: Option<u64>,
    /// Abort with [`ColoringError::RoundLimitExceeded`] after this many rounds.
    pub max_rounds: Option<usize>,
}

impl Default for ColoringConfig {
    fn default() -> Self {
        Self {
            palette_size: 8,
            strategy: Strategy::Randomized,
            seed: None,
            max_rounds: None,
        }
    }
}

impl ColoringConfig {
    pub fn new(palette_size: Color) -> Self {
        Self {
            palette_size,
            ..Default::default()
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = Some(rounds);
        self
    }
}

/// Outcome of a successful run; identical on every rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColoringStats {
    pub strategy: Strategy,
    pub rounds: usize,
    /// Uncolored vertices remaining after each round (non-increasing).
    pub uncolored_after_round: Vec<usize>,
}

impl ColoringStats {
    fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            rounds: 0,
            uncolored_after_round: Vec::new(),
        }
    }

    fn record_round(&mut self, uncolored: usize) {
        self.rounds += 1;
        self.uncolored_after_round.push(uncolored);
    }
}

/// Color `graph` with the randomized protocol and colors `1..=palette_size`.
///
/// Must be called collectively: every rank of `comm` passes a structurally
/// identical graph. On success all replicas hold the same proper coloring.
pub fn color<C: Communicator>(
    graph: &mut Graph,
    comm: &C,
    palette_size: Color,
) -> Result<ColoringStats, ColoringError> {
    color_with(graph, comm, &ColoringConfig::new(palette_size))
}

/// Color `graph` according to `cfg`. See [`color`] for the calling contract.
pub fn color_with<C: Communicator>(
    graph: &mut Graph,
    comm: &C,
    cfg: &ColoringConfig,
) -> Result<ColoringStats, ColoringError> {
    if cfg.palette_size == 0 {
        return Err(ColoringError::InvalidPalette(cfg.palette_size));
    }
    let ctx = RankContext::new(comm.rank(), comm.size(), graph.vertex_count())?;
    if ctx.owned.is_empty() && !graph.is_empty() {
        log::warn!(
            "[rank {}] owns no vertices ({} vertices over {} ranks)",
            ctx.rank,
            graph.vertex_count(),
            ctx.layout.world_size()
        );
    }

    let stats = match cfg.strategy {
        Strategy::Randomized => luby::color_randomized(graph, comm, cfg, &ctx)?,
        Strategy::TurnBased => turns::color_turn_based(graph, comm, cfg, &ctx)?,
    };
    log::info!(
        "[rank {}] {} coloring converged after {} rounds",
        ctx.rank,
        stats.strategy,
        stats.rounds
    );
    Ok(stats)
}

/// Who this rank is and which vertices it may write between collectives.
#[derive(Debug, Clone)]
pub(crate) struct RankContext {
    pub rank: usize,
    pub layout: VertexPartition,
    pub owned: Range<VertexId>,
}

impl RankContext {
    pub(crate) fn new(rank: usize, size: usize, vertex_count: usize) -> Result<Self, ColoringError> {
        if rank >= size {
            return Err(ColoringError::InvalidRank { rank, size });
        }
        let layout = partition(vertex_count, size)?;
        let owned = layout.range(rank);
        Ok(Self {
            rank,
            layout,
            owned,
        })
    }
}

/// Lowest color in `1..=palette_size` not held by any neighbor of `v` in `colors`.
pub(crate) fn first_free_color(
    graph: &Graph,
    colors: &[Color],
    v: VertexId,
    palette_size: Color,
) -> Option<Color> {
    let node = &graph.nodes()[v];
    // degree + 1 candidates always contain a free one
    let limit = palette_size.min(u32::try_from(node.degree()).unwrap_or(u32::MAX).saturating_add(1));
    let mut used = vec![false; limit as usize + 1];
    for u in node.neighbors() {
        let c = colors[u];
        if c != UNCOLORED && c <= limit {
            used[c as usize] = true;
        }
    }
    (1..=limit).find(|&c| !used[c as usize])
}

/// True if some neighbor of `v` holds `v`'s (non-zero) color.
pub(crate) fn has_conflict(graph: &Graph, colors: &[Color], v: VertexId) -> bool {
    let c = colors[v];
    c != UNCOLORED && graph.nodes()[v].neighbors().any(|u| colors[u] == c)
}

/// Errors once `round` passes the configured cap. Every rank counts rounds
/// identically, so the check needs no collective.
pub(crate) fn check_round_limit(cfg: &ColoringConfig, round: usize) -> Result<(), ColoringError> {
    match cfg.max_rounds {
        Some(max) if round > max => Err(ColoringError::RoundLimitExceeded { rounds: max }),
        _ => Ok(()),
    }
}

/// Per-rank generator seed: distinct across ranks, and across runs when unseeded.
pub(crate) fn seed_for_rank(seed: Option<u64>, rank: usize) -> u64 {
    let base = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    base ^ (rank as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
