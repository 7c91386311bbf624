//! Command-line driver: color a random graph across ranks, or solve a small
//! instance exactly.
//!
//! Run with: cargo run --bin dist-color -- distributed --vertices 200 --density 0.05 --colors 12 --ranks 4
//! or, one rank per process: mpirun -n 4 target/release/dist-color distributed --backend mpi ...

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use dist_coloring::prelude::*;

const ROOT: usize = 0;

#[derive(Parser, Debug)]
#[command(name = "dist-color")]
#[command(about = "Distributed vertex coloring over collective communication")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a random graph on rank 0, distribute it, and color it cooperatively
    Distributed(DistributedArgs),
    /// Search for an exact coloring with the backtracking solver
    Exhaustive(ExhaustiveArgs),
}

#[derive(Args, Debug, Clone)]
struct GraphArgs {
    /// Number of vertices
    #[arg(long, default_value = "100")]
    vertices: usize,

    /// Edge probability for every vertex pair (clamped to [0, 1])
    #[arg(long, default_value = "0.1")]
    density: f64,

    /// Palette size; colors 1..=K may be used
    #[arg(long, default_value = "8")]
    colors: Color,

    /// Seed for graph generation and protocol priorities (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Ranks are threads of this process
    Threads,
    /// One rank per MPI process (requires the `mpi-support` feature)
    Mpi,
}

#[derive(Args, Debug, Clone)]
struct DistributedArgs {
    #[command(flatten)]
    graph: GraphArgs,

    /// Coloring protocol: `randomized` or `turns`
    #[arg(long, default_value = "randomized")]
    strategy: Strategy,

    /// Number of ranks for the threads backend
    #[arg(long, default_value = "4")]
    ranks: usize,

    #[arg(long, value_enum, default_value = "threads")]
    backend: Backend,

    /// Abort if the protocol has not converged after this many rounds
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Where rank 0 writes the colored graph
    #[arg(long, default_value = "graph.out")]
    output: PathBuf,

    /// Print a JSON summary after the human-readable report
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct ExhaustiveArgs {
    #[command(flatten)]
    graph: GraphArgs,
}

impl DistributedArgs {
    fn config(&self) -> ColoringConfig {
        ColoringConfig {
            palette_size: self.graph.colors,
            strategy: self.strategy,
            seed: self.graph.seed,
            max_rounds: self.max_rounds,
        }
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    vertices: usize,
    edges: usize,
    palette_size: Color,
    ranks: usize,
    distinct_colors: usize,
    valid: bool,
    elapsed_ms: f64,
    stats: &'a ColoringStats,
}

/// What rank 0 knows once the protocol has finished.
struct RootView {
    graph: Graph,
    stats: ColoringStats,
    ranks: usize,
}

/// Everything one rank does: receive the graph from the root, then color it.
fn run_rank<C: Communicator>(
    comm: &C,
    args: &DistributedArgs,
) -> Result<(Graph, ColoringStats), ColoringError> {
    let source = (comm.rank() == ROOT)
        .then(|| Graph::random(args.graph.vertices, args.graph.density, args.graph.seed));
    let mut graph = distribute_graph(comm, ROOT, source.as_ref(), args.graph.vertices)?;
    let stats = color_with(&mut graph, comm, &args.config())?;
    Ok((graph, stats))
}

fn run_threads(args: &DistributedArgs) -> Result<RootView> {
    if args.ranks == 0 {
        bail!("--ranks must be at least 1");
    }
    let world = ThreadComm::world(args.ranks);
    let mut outcomes: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = world
            .iter()
            .map(|comm| s.spawn(move || run_rank(comm, args)))
            .collect();
        handles.into_iter().map(|h| h.join()).collect()
    });
    // every rank agrees on the outcome; report the root's view
    match outcomes.swap_remove(ROOT) {
        Ok(outcome) => {
            let (graph, stats) = outcome.context("distributed coloring failed")?;
            Ok(RootView {
                graph,
                stats,
                ranks: args.ranks,
            })
        }
        Err(_) => bail!("rank {ROOT} panicked"),
    }
}

/// `None` on every rank but the root.
#[cfg(feature = "mpi-support")]
fn run_mpi(args: &DistributedArgs) -> Result<Option<RootView>> {
    let comm = MpiComm::new().context("failed to initialize MPI")?;
    let (graph, stats) = run_rank(&comm, args).context("distributed coloring failed")?;
    Ok((comm.rank() == ROOT).then(|| RootView {
        graph,
        stats,
        ranks: comm.size(),
    }))
}

#[cfg(not(feature = "mpi-support"))]
fn run_mpi(_args: &DistributedArgs) -> Result<Option<RootView>> {
    bail!("this binary was built without the `mpi-support` feature")
}

fn report(args: &DistributedArgs, view: &RootView, elapsed: Duration) -> Result<bool> {
    let RootView {
        graph,
        stats,
        ranks,
    } = view;
    let ranks = *ranks;
    let dot = graph.to_dot();
    print!("{dot}");
    std::fs::write(&args.output, &dot)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    let valid = match graph.validate_coloring() {
        Ok(()) => true,
        Err(violation) => {
            eprintln!("invalid coloring: {violation}");
            false
        }
    };
    let distinct = graph.distinct_colors();
    println!("Number of colors used: {distinct}");
    println!("Coloring is {}", if valid { "valid" } else { "INVALID" });
    println!(
        "Rounds: {} ({} strategy, {} ranks)",
        stats.rounds, stats.strategy, ranks
    );
    println!("Time: {:.3} ms", elapsed.as_secs_f64() * 1e3);

    if args.json {
        let summary = Summary {
            vertices: graph.vertex_count(),
            edges: graph.edge_count(),
            palette_size: args.graph.colors,
            ranks,
            distinct_colors: distinct,
            valid,
            elapsed_ms: elapsed.as_secs_f64() * 1e3,
            stats,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(valid)
}

fn distributed(args: &DistributedArgs) -> Result<bool> {
    let start = Instant::now();
    let view = match args.backend {
        Backend::Threads => Some(run_threads(args)?),
        Backend::Mpi => run_mpi(args)?,
    };
    let elapsed = start.elapsed();
    match view {
        Some(view) => report(args, &view, elapsed),
        None => Ok(true),
    }
}

fn exhaustive(args: &ExhaustiveArgs) -> Result<bool> {
    let g = &args.graph;
    if g.colors == 0 {
        bail!("--colors must be at least 1");
    }
    let graph = Graph::random(g.vertices, g.density, g.seed);
    let start = Instant::now();
    let solution = color_exhaustive(&graph, g.colors);
    let elapsed = start.elapsed();
    match solution {
        Some(colors) => {
            for (v, c) in colors.iter().enumerate() {
                println!("vertex {v}: color {c}");
            }
        }
        None => println!("No solution exists."),
    }
    println!("Time: {:.3} ms", elapsed.as_secs_f64() * 1e3);
    Ok(true)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let outcome = match &cli.command {
        Command::Distributed(args) => distributed(args),
        Command::Exhaustive(args) => exhaustive(args),
    };
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
