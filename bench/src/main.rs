use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use slot_graph_core::{
    search_bfs_with, search_dfs_with, shortest_path, Graph, GraphError, ShortestPath, VertexId,
    VisitedSet, Weight,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Paths with at most this many hops are included verbatim in the JSON report.
const SAMPLE_PATH_MAX_HOPS: usize = 32;

#[derive(Debug, Parser)]
#[command(
    name = "slot-graph-bench",
    about = "Time DFS, BFS and shortest path over generated fixed-capacity graphs"
)]
struct Args {
    /// Graph generator to run.
    #[arg(value_enum, default_value_t = Mode::All, env = "SLOT_GRAPH_BENCH_MODE")]
    mode: Mode,

    /// Graph capacity; every slot receives a vertex.
    #[arg(short = 'n', long, default_value_t = 1_000_000, env = "SLOT_GRAPH_BENCH_VERTICES")]
    vertices: usize,

    /// Seed for the deterministic generators and query picks.
    #[arg(long, default_value_t = 42, env = "SLOT_GRAPH_BENCH_SEED")]
    seed: u64,

    /// Traversal/shortest-path queries per graph.
    #[arg(short, long, default_value_t = 5, env = "SLOT_GRAPH_BENCH_QUERIES")]
    queries: usize,

    /// Emit a JSON report on stdout instead of a table.
    #[arg(long, env = "SLOT_GRAPH_BENCH_JSON")]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    All,
    Chain,
    Tree,
    Grid,
    Random,
    Barbell,
}

type Generator = fn(usize, &mut FastRng) -> Graph;

impl Mode {
    fn generators(self) -> Vec<(&'static str, Generator)> {
        let all: [(Mode, &'static str, Generator); 5] = [
            (Mode::Chain, "Weighted chain", gen_chain),
            (Mode::Tree, "Branching tree (directed)", gen_tree),
            (Mode::Grid, "Square grid", gen_grid),
            (Mode::Random, "Erdos-Renyi random (directed)", gen_random),
            (Mode::Barbell, "Barbell (clique-bridge-clique)", gen_barbell),
        ];
        all.into_iter()
            .filter(|(m, _, _)| self == Mode::All || *m == self)
            .map(|(_, name, generator)| (name, generator))
            .collect()
    }
}

#[derive(Debug, Serialize)]
struct GraphReport {
    name: &'static str,
    vertices: usize,
    edge_entries: usize,
    memory_bytes: usize,
    generate_ms: f64,
    queries: Vec<QueryReport>,
}

#[derive(Debug, Serialize)]
struct QueryReport {
    start: VertexId,
    target: VertexId,
    dfs_visited: usize,
    dfs_ms: f64,
    bfs_visited: usize,
    bfs_ms: f64,
    path_ms: f64,
    path_hops: Option<usize>,
    path_weight: Option<Weight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_path: Option<ShortestPath>,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.vertices < 2 {
        bail!("--vertices must be at least 2, got {}", args.vertices);
    }

    info!(mode = ?args.mode, vertices = args.vertices, seed = args.seed, "slot-graph-bench");

    let mut reports = Vec::new();
    for (name, generator) in args.mode.generators() {
        let report = run_benchmark(name, generator, &args);
        if !args.json {
            print_report(&report);
        }
        reports.push(report);
    }

    if args.json {
        let out = serde_json::to_string_pretty(&reports).context("serializing bench report")?;
        println!("{}", out);
    }

    Ok(())
}

fn run_benchmark(name: &'static str, generator: Generator, args: &Args) -> GraphReport {
    let mut rng = FastRng::new(args.seed);

    let t = Instant::now();
    let graph = generator(args.vertices, &mut rng);
    let generate_ms = ms_since(t);
    info!(
        graph = name,
        vertices = graph.vertex_count(),
        edge_entries = graph.edge_count(),
        generate_ms,
        "generated"
    );

    // One visited set reused across every traversal on this graph.
    let mut visited = VisitedSet::for_graph(&graph);
    let capacity = graph.capacity() as u64;

    let queries = (0..args.queries)
        .map(|i| {
            // First query always runs from the root/hub at 0 to the far end.
            let (start, target) = if i == 0 {
                (0, graph.capacity() - 1)
            } else {
                (rng.next(capacity) as VertexId, rng.next(capacity) as VertexId)
            };
            run_query(&graph, &mut visited, start, target)
        })
        .collect();

    GraphReport {
        name,
        vertices: graph.vertex_count(),
        edge_entries: graph.edge_count(),
        memory_bytes: graph.memory_usage(),
        generate_ms,
        queries,
    }
}

fn run_query(
    graph: &Graph,
    visited: &mut VisitedSet,
    start: VertexId,
    target: VertexId,
) -> QueryReport {
    let t = Instant::now();
    let dfs_visited = search_dfs_with(graph, start, visited).len();
    let dfs_ms = ms_since(t);

    let t = Instant::now();
    let bfs_visited = search_bfs_with(graph, start, visited).len();
    let bfs_ms = ms_since(t);

    let t = Instant::now();
    let path = shortest_path(graph, start, target);
    let path_ms = ms_since(t);

    let (path_hops, path_weight, sample_path) = match path {
        Ok(p) => {
            let hops = p.hops();
            let weight = p.total_weight;
            let sample = (hops <= SAMPLE_PATH_MAX_HOPS).then_some(p);
            (Some(hops), Some(weight), sample)
        }
        Err(GraphError::NoPathExists { .. }) => (None, None, None),
        Err(err) => {
            warn!(start, target, %err, "shortest path failed");
            (None, None, None)
        }
    };

    QueryReport {
        start,
        target,
        dfs_visited,
        dfs_ms,
        bfs_visited,
        bfs_ms,
        path_ms,
        path_hops,
        path_weight,
        sample_path,
    }
}

fn print_report(report: &GraphReport) {
    println!("--- {} ---", report.name);
    println!(
        "Generated in {:.2}ms: {} vertices, {} edge entries, ~{:.1}MB",
        report.generate_ms,
        report.vertices,
        report.edge_entries,
        report.memory_bytes as f64 / 1_048_576.0
    );
    println!();
    println!(
        "{:>9} {:>9} {:>9} {:>10} {:>9} {:>10} {:>7} {:>10} {:>10}",
        "start", "target", "dfs", "dfs time", "bfs", "bfs time", "hops", "weight", "path time"
    );
    println!(
        "{:->9} {:->9} {:->9} {:->10} {:->9} {:->10} {:->7} {:->10} {:->10}",
        "", "", "", "", "", "", "", "", ""
    );
    for q in &report.queries {
        let hops = q.path_hops.map_or_else(|| "-".to_string(), |h| h.to_string());
        let weight = q.path_weight.map_or_else(|| "no path".to_string(), |w| w.to_string());
        println!(
            "{:>9} {:>9} {:>9} {:>8.1}ms {:>9} {:>8.1}ms {:>7} {:>10} {:>8.1}ms",
            q.start,
            q.target,
            q.dfs_visited,
            q.dfs_ms,
            q.bfs_visited,
            q.bfs_ms,
            hops,
            weight,
            q.path_ms
        );
    }
    println!();
}

fn ms_since(t: Instant) -> f64 {
    t.elapsed().as_secs_f64() * 1000.0
}

// ---------------------------------------------------------------------------
// Generators: all O(n + edges), single-threaded, deterministic per seed.
// Every generator fills all `n` slots with vertices.
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    /// Edge weight in `1..=10`.
    fn weight(&mut self) -> Weight {
        self.next(10) as Weight + 1
    }
}

fn filled(n: usize) -> Graph {
    let mut graph = Graph::new(n);
    for id in 0..n {
        graph.add_vertex(id);
    }
    graph
}

/// Undirected path 0 - 1 - ... - n-1. Longest possible DFS stack and path.
fn gen_chain(n: usize, rng: &mut FastRng) -> Graph {
    let mut graph = filled(n);
    for i in 0..n - 1 {
        graph.add_undirected_edge(i, i + 1, rng.weight());
    }
    graph
}

/// Directed tree: each vertex gets up to 3 children, ids assigned level by level.
/// Paths only run away from the root, so most random queries have no path.
fn gen_tree(n: usize, rng: &mut FastRng) -> Graph {
    let branching = 3;
    let mut graph = filled(n);

    let mut next_id = 1;
    let mut frontier = vec![0];

    while next_id < n && !frontier.is_empty() {
        let mut next_frontier = Vec::with_capacity(frontier.len() * branching);
        for &parent in &frontier {
            for _ in 0..branching {
                if next_id >= n {
                    break;
                }
                graph.add_weighted_directed_edge(parent, next_id, rng.weight());
                next_frontier.push(next_id);
                next_id += 1;
            }
        }
        frontier = next_frontier;
    }

    graph
}

/// Undirected square grid; leftover ids past the last full row stay isolated.
fn gen_grid(n: usize, rng: &mut FastRng) -> Graph {
    let side = (n as f64).sqrt() as usize;
    let mut graph = filled(n);

    for row in 0..side {
        for col in 0..side {
            let id = row * side + col;
            if col + 1 < side {
                graph.add_undirected_edge(id, id + 1, rng.weight());
            }
            if row + 1 < side {
                graph.add_undirected_edge(id, id + side, rng.weight());
            }
        }
    }

    graph
}

/// Erdos-Renyi: ~5 uniformly random weighted directed edges per vertex.
fn gen_random(n: usize, rng: &mut FastRng) -> Graph {
    let mut graph = filled(n);

    for _ in 0..n * 5 {
        let from = rng.next(n as u64) as VertexId;
        let to = rng.next(n as u64) as VertexId;
        if from != to {
            graph.add_weighted_directed_edge(from, to, rng.weight());
        }
    }

    graph
}

/// Barbell: two dense clusters joined by a thin undirected bridge of ~10 vertices.
fn gen_barbell(n: usize, rng: &mut FastRng) -> Graph {
    let bridge_len = 10.min(n / 3);
    let cluster = (n - bridge_len) / 2;
    let mut graph = filled(n);

    let mut connect_cluster = |graph: &mut Graph, base: usize, size: usize| {
        if size < 2 {
            return;
        }
        for i in 0..size {
            for _ in 0..10.min(size - 1) {
                let target = rng.next(size as u64) as usize;
                if target != i {
                    graph.add_undirected_edge(base + i, base + target, rng.weight());
                }
            }
        }
    };

    // Cluster A: 0..cluster
    connect_cluster(&mut graph, 0, cluster);

    // Bridge: chain from the last vertex of A through the bridge into B
    let b_start = cluster + bridge_len;
    for id in cluster..=b_start.min(n - 1) {
        if id > 0 {
            graph.add_undirected_edge(id - 1, id, 1);
        }
    }

    // Cluster B: everything after the bridge
    connect_cluster(&mut graph, b_start, n - b_start);

    graph
}
