//! slot-graph-core: fixed-capacity graph with traversal and shortest path.
//!
//! The graph is a table of slots indexed by vertex id. Each slot owns an
//! optional vertex and an adjacency list of weighted edges. Traversals
//! (DFS, BFS) and Dijkstra shortest path borrow the graph immutably and keep
//! their bookkeeping in caller-scoped state, so they can run concurrently
//! on a shared graph.

mod error;
mod graph;
mod traversal;
mod visited;

pub use error::{GraphError, Result};
pub use graph::{Edge, Graph, Vertex, VertexId, Weight, DEFAULT_WEIGHT};
pub use traversal::{
    search_bfs, search_bfs_with, search_dfs, search_dfs_with, shortest_path, ShortestPath,
};
pub use visited::VisitedSet;
