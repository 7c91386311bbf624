mod util;
use util::*;

use dist_coloring::algs::coloring::{ColoringConfig, Strategy, color, color_with};
use dist_coloring::algs::communicator::Communicator;
use dist_coloring::algs::distribute::distribute_graph;
use dist_coloring::coloring_error::ColoringError;
use dist_coloring::graph::Graph;

const STRATEGIES: [Strategy; 2] = [Strategy::Randomized, Strategy::TurnBased];

#[test]
fn diamond_two_ranks_both_strategies() {
    for strategy in STRATEGIES {
        for seed in 0..20u64 {
            let cfg = ColoringConfig::new(3).with_strategy(strategy).with_seed(seed);
            let replicas = run_world(2, |comm| {
                let mut g = diamond();
                color_with(&mut g, comm, &cfg).expect("3 colors suffice");
                g.colors()
            });
            let colors = assert_converged(&replicas);
            assert_proper(&diamond(), &colors, 3);
        }
    }
}

#[test]
fn default_entry_point_uses_randomized() {
    let stats = run_world(2, |comm| {
        let mut g = diamond();
        color(&mut g, comm, 3).unwrap()
    });
    assert!(stats.iter().all(|s| s.strategy == Strategy::Randomized));
    assert_eq!(stats[0], stats[1]);
}

#[test]
fn random_graphs_many_ranks() {
    for strategy in STRATEGIES {
        for (trial, &ranks) in [1usize, 2, 3, 4, 7].iter().enumerate() {
            let g = Graph::random(60, 0.15, Some(trial as u64));
            let palette = g.max_degree() as u32 + 1;
            let cfg = ColoringConfig::new(palette)
                .with_strategy(strategy)
                .with_seed(trial as u64 * 31);
            let replicas = run_world(ranks, |comm| {
                let mut local = g.clone();
                let stats = color_with(&mut local, comm, &cfg).expect("degree+1 colors suffice");
                (local.colors(), stats)
            });
            let colors: Vec<_> = replicas.iter().map(|(c, _)| c.clone()).collect();
            let shared = assert_converged(&colors);
            assert_proper(&g, &shared, palette);
            let first_stats = &replicas[0].1;
            assert!(replicas.iter().all(|(_, s)| s == first_stats));
        }
    }
}

#[test]
fn progress_is_monotonic_and_terminates_under_round_cap() {
    for seed in 0..30u64 {
        let g = Graph::random(80, 0.1, Some(1000 + seed));
        let palette = g.max_degree() as u32 + 1;
        let cfg = ColoringConfig::new(palette).with_seed(seed).with_max_rounds(200);
        let stats = run_world(3, |comm| {
            let mut local = g.clone();
            color_with(&mut local, comm, &cfg).expect("terminates within cap")
        });
        let trace = &stats[0].uncolored_after_round;
        assert!(trace.windows(2).all(|w| w[1] < w[0]), "seed {seed}: {trace:?}");
        assert_eq!(trace.last(), Some(&0));
        assert_eq!(trace.len(), stats[0].rounds);
    }
}

#[test]
fn palette_of_one_fails_on_every_rank() {
    for strategy in STRATEGIES {
        let errs = run_world(3, |comm| {
            let mut g = graph_from(5, &[(3, 4)]);
            color_with(&mut g, comm, &ColoringConfig::new(1).with_strategy(strategy).with_seed(9))
                .expect_err("an edge cannot be 1-colored")
        });
        let rounds: Vec<usize> = errs
            .iter()
            .map(|e| match e {
                ColoringError::PaletteExhausted { palette_size: 1, round } => *round,
                other => panic!("unexpected error {other:?}"),
            })
            .collect();
        assert!(rounds.iter().all(|&r| r == rounds[0]), "split-brain: {rounds:?}");
    }
}

#[test]
fn edgeless_graph_with_palette_of_one() {
    for strategy in STRATEGIES {
        let replicas = run_world(2, |comm| {
            let mut g = Graph::new(5);
            let cfg = ColoringConfig::new(1).with_strategy(strategy);
            color_with(&mut g, comm, &cfg).unwrap();
            g.colors()
        });
        assert_eq!(assert_converged(&replicas), vec![1; 5]);
    }
}

#[test]
fn more_ranks_than_vertices() {
    for strategy in STRATEGIES {
        let replicas = run_world(5, |comm| {
            let mut g = graph_from(3, &[(0, 1), (1, 2), (0, 2)]);
            let cfg = ColoringConfig::new(3).with_strategy(strategy).with_seed(2);
            color_with(&mut g, comm, &cfg).unwrap();
            g.colors()
        });
        let colors = assert_converged(&replicas);
        assert_proper(&graph_from(3, &[(0, 1), (1, 2), (0, 2)]), &colors, 3);
    }
}

#[test]
fn empty_graph_succeeds_without_rounds() {
    let stats = run_world(3, |comm| {
        let mut g = Graph::new(0);
        color_with(&mut g, comm, &ColoringConfig::new(1)).unwrap()
    });
    assert!(stats.iter().all(|s| s.rounds == 0));
}

#[test]
fn round_cap_is_agreed() {
    let errs = run_world(2, |comm| {
        let mut g = Graph::random(40, 0.5, Some(3));
        let cfg = ColoringConfig::new(40).with_seed(1).with_max_rounds(1);
        color_with(&mut g, comm, &cfg).unwrap_err()
    });
    assert!(errs
        .iter()
        .all(|e| matches!(e, ColoringError::RoundLimitExceeded { rounds: 1 })));
}

#[test]
fn distribute_then_color() {
    let source = Graph::random(50, 0.2, Some(77));
    let palette = source.max_degree() as u32 + 1;
    let replicas = run_world(4, |comm| {
        let root_graph = (comm.rank() == 0).then_some(&source);
        let mut g = distribute_graph(comm, 0, root_graph, 50).expect("distribution");
        assert_eq!(g.serialize(), source.serialize());
        color_with(&mut g, comm, &ColoringConfig::new(palette).with_seed(4)).unwrap();
        g.colors()
    });
    let colors = assert_converged(&replicas);
    assert_proper(&source, &colors, palette);
}
