use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use serde::Serialize;
use tracing::trace;

use crate::error::{GraphError, Result};
use crate::graph::{Graph, VertexId, Weight};
use crate::visited::VisitedSet;

/// A minimum-weight path, including both endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortestPath {
    pub vertices: Vec<VertexId>,
    pub total_weight: Weight,
}

impl ShortestPath {
    /// Number of edges on the path.
    pub fn hops(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }
}

/// Depth-first search from `start`, returning vertices in visitation order.
///
/// Stack-based: after visiting a vertex its unvisited neighbors are pushed
/// in adjacency order, so the last-added neighbor is explored first.
/// Returns an empty Vec if `start` is out of range or has no vertex.
pub fn search_dfs(graph: &Graph, start: VertexId) -> Vec<VertexId> {
    let mut visited = VisitedSet::for_graph(graph);
    search_dfs_with(graph, start, &mut visited)
}

/// [`search_dfs`] using a caller-owned visited set.
///
/// The set is cleared before the traversal starts and holds every reached
/// vertex afterwards. For an invalid `start` it is left untouched.
pub fn search_dfs_with(
    graph: &Graph,
    start: VertexId,
    visited: &mut VisitedSet,
) -> Vec<VertexId> {
    if !graph.contains_vertex(start) {
        trace!(start, "dfs: no vertex at start");
        return Vec::new();
    }
    visited.ensure_len(graph.capacity());
    visited.clear();

    let mut order = Vec::new();
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        // Stale duplicates are skipped without re-expanding their neighbors.
        if !visited.visit(current) {
            continue;
        }
        order.push(current);
        stack.extend(graph.neighbors(current).filter(|&n| !visited.is_visited(n)));
    }

    trace!(start, visited = order.len(), "dfs complete");
    order
}

/// Breadth-first search from `start`, returning vertices in visitation order.
///
/// All neighbors of a vertex are visited before any of theirs, ties broken
/// by adjacency order. Returns an empty Vec if `start` is out of range or
/// has no vertex.
pub fn search_bfs(graph: &Graph, start: VertexId) -> Vec<VertexId> {
    let mut visited = VisitedSet::for_graph(graph);
    search_bfs_with(graph, start, &mut visited)
}

/// [`search_bfs`] using a caller-owned visited set. Same clearing rules as
/// [`search_dfs_with`].
pub fn search_bfs_with(
    graph: &Graph,
    start: VertexId,
    visited: &mut VisitedSet,
) -> Vec<VertexId> {
    if !graph.contains_vertex(start) {
        trace!(start, "bfs: no vertex at start");
        return Vec::new();
    }
    visited.ensure_len(graph.capacity());
    visited.clear();

    let mut order = Vec::new();
    let mut queue: VecDeque<VertexId> = VecDeque::new();

    // Marking on enqueue yields the same order as marking on dequeue,
    // without queueing duplicates.
    visited.visit(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        order.push(current);
        for next in graph.neighbors(current) {
            if visited.visit(next) {
                queue.push_back(next);
            }
        }
    }

    trace!(start, visited = order.len(), "bfs complete");
    order
}

/// Minimum total weight path from `begin` to `end` (Dijkstra).
///
/// Follows adjacency lists as stored, so undirected edges are traversable
/// both ways and directed edges only forward.
///
/// Before searching, every edge in the graph is scanned for a negative
/// weight, so each call costs O(E) on top of the O((V + E) log V) search.
/// Running totals are summed in `i128`, so paths whose intermediate sums
/// exceed `Weight::MAX` still compare correctly.
///
/// Errors:
/// - `VertexNotFound` if either endpoint is out of range or absent.
/// - `InvalidWeight` if any edge in the graph has a negative weight.
/// - `NoPathExists` if `end` is unreachable from `begin`.
/// - `WeightOverflow` if the lightest path's total exceeds `Weight::MAX`.
pub fn shortest_path(graph: &Graph, begin: VertexId, end: VertexId) -> Result<ShortestPath> {
    for id in [begin, end] {
        if !graph.contains_vertex(id) {
            return Err(GraphError::VertexNotFound(id));
        }
    }

    if let Some((from, edge)) = graph.edges().find(|(_, e)| e.weight < 0) {
        return Err(GraphError::InvalidWeight {
            from,
            to: edge.target,
            weight: edge.weight,
        });
    }

    if begin == end {
        return Ok(ShortestPath {
            vertices: vec![begin],
            total_weight: 0,
        });
    }

    let capacity = graph.capacity();
    let mut dist: Vec<Option<i128>> = vec![None; capacity];
    let mut parent: Vec<Option<VertexId>> = vec![None; capacity];
    let mut settled = VisitedSet::new(capacity);
    let mut heap: BinaryHeap<Reverse<(i128, VertexId)>> = BinaryHeap::new();

    dist[begin] = Some(0);
    heap.push(Reverse((0, begin)));

    while let Some(Reverse((distance, current))) = heap.pop() {
        if !settled.visit(current) {
            continue;
        }

        if current == end {
            let total_weight = Weight::try_from(distance).map_err(|_| {
                GraphError::WeightOverflow {
                    from: begin,
                    to: end,
                }
            })?;
            let path = reconstruct_path(&parent, end, total_weight);
            trace!(
                begin,
                end,
                weight = total_weight,
                hops = path.hops(),
                "shortest path found"
            );
            return Ok(path);
        }

        for edge in graph.get_adjacent(current) {
            if settled.is_visited(edge.target) {
                continue;
            }
            // V * Weight::MAX always fits in i128.
            let candidate = distance + i128::from(edge.weight);
            let improves = match dist[edge.target] {
                Some(best) => candidate < best,
                None => true,
            };
            if improves {
                dist[edge.target] = Some(candidate);
                parent[edge.target] = Some(current);
                heap.push(Reverse((candidate, edge.target)));
            }
        }
    }

    trace!(begin, end, settled = settled.count(), "no path");
    Err(GraphError::NoPathExists {
        from: begin,
        to: end,
    })
}

/// Walk parent pointers from `end` back to the root.
fn reconstruct_path(
    parent: &[Option<VertexId>],
    end: VertexId,
    total_weight: Weight,
) -> ShortestPath {
    let mut vertices = vec![end];
    let mut current = end;

    while let Some(prev) = parent[current] {
        vertices.push(prev);
        current = prev;
    }

    vertices.reverse();
    ShortestPath {
        vertices,
        total_weight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DEFAULT_WEIGHT;

    fn with_vertices(capacity: usize, count: usize) -> Graph {
        let mut g = Graph::new(capacity);
        for i in 0..count {
            g.add_vertex(i);
        }
        g
    }

    fn make_chain(n: usize) -> Graph {
        let mut g = with_vertices(n, n);
        for i in 0..n - 1 {
            g.add_directed_edge(i, i + 1);
        }
        g
    }

    fn make_star(leaves: usize) -> Graph {
        let mut g = with_vertices(leaves + 1, leaves + 1);
        for i in 1..=leaves {
            g.add_undirected_edge(0, i, 1);
        }
        g
    }

    fn make_cycle(n: usize) -> Graph {
        let mut g = with_vertices(n, n);
        for i in 0..n {
            g.add_directed_edge(i, (i + 1) % n);
        }
        g
    }

    /// capacity 5; vertices 0..=3; edges 0->1, 1->2, 0->3.
    fn make_sample() -> Graph {
        let mut g = with_vertices(5, 4);
        g.add_directed_edge(0, 1);
        g.add_directed_edge(1, 2);
        g.add_directed_edge(0, 3);
        g
    }

    /// Undirected triangle: (0,1,4), (1,2,1), (0,2,10).
    fn make_triangle() -> Graph {
        let mut g = with_vertices(3, 3);
        g.add_undirected_edge(0, 1, 4);
        g.add_undirected_edge(1, 2, 1);
        g.add_undirected_edge(0, 2, 10);
        g
    }

    // --- DFS / BFS ---

    #[test]
    fn test_bfs_sample_order() {
        assert_eq!(search_bfs(&make_sample(), 0), vec![0, 1, 3, 2]);
    }

    #[test]
    fn test_dfs_sample_order() {
        assert_eq!(search_dfs(&make_sample(), 0), vec![0, 3, 1, 2]);
    }

    #[test]
    fn test_isolated_start() {
        let g = with_vertices(4, 4);
        assert_eq!(search_dfs(&g, 2), vec![2]);
        assert_eq!(search_bfs(&g, 2), vec![2]);
    }

    #[test]
    fn test_absent_start_returns_empty() {
        let g = with_vertices(4, 2);
        assert!(search_dfs(&g, 3).is_empty());
        assert!(search_bfs(&g, 3).is_empty());
        assert!(search_dfs(&g, 100).is_empty());
        assert!(search_bfs(&g, 100).is_empty());
    }

    #[test]
    fn test_absent_start_leaves_visited_untouched() {
        let g = make_chain(4);
        let mut visited = VisitedSet::for_graph(&g);
        search_dfs_with(&g, 1, &mut visited);
        let before = visited.clone();

        assert!(search_dfs_with(&g, 9, &mut visited).is_empty());
        assert_eq!(visited, before);
        assert!(search_bfs_with(&g, 9, &mut visited).is_empty());
        assert_eq!(visited, before);
    }

    #[test]
    fn test_chain_directed_only_forward() {
        let g = make_chain(5);
        assert_eq!(search_bfs(&g, 0), vec![0, 1, 2, 3, 4]);
        assert_eq!(search_dfs(&g, 2), vec![2, 3, 4]);
        assert_eq!(search_bfs(&g, 4), vec![4]);
    }

    #[test]
    fn test_cycle_no_infinite_loop() {
        let g = make_cycle(5);
        assert_eq!(search_dfs(&g, 3), vec![3, 4, 0, 1, 2]);
        assert_eq!(search_bfs(&g, 3), vec![3, 4, 0, 1, 2]);
    }

    #[test]
    fn test_star_bfs_visits_leaves_in_order() {
        let g = make_star(5);
        assert_eq!(search_bfs(&g, 0), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(search_dfs(&g, 0), vec![0, 5, 4, 3, 2, 1]);
        assert_eq!(search_bfs(&g, 3), vec![3, 0, 1, 2, 4, 5]);
    }

    #[test]
    fn test_self_loop_and_parallel_edges() {
        let mut g = with_vertices(2, 2);
        g.add_directed_edge(0, 0);
        g.add_directed_edge(0, 1);
        g.add_directed_edge(0, 1);
        assert_eq!(search_dfs(&g, 0), vec![0, 1]);
        assert_eq!(search_bfs(&g, 0), vec![0, 1]);
    }

    #[test]
    fn test_dfs_goes_deep_before_wide() {
        // 0 -> {1, 2}, 2 -> 3, 1 -> 4
        let mut g = with_vertices(5, 5);
        g.add_directed_edge(0, 1);
        g.add_directed_edge(0, 2);
        g.add_directed_edge(2, 3);
        g.add_directed_edge(1, 4);
        assert_eq!(search_dfs(&g, 0), vec![0, 2, 3, 1, 4]);
        assert_eq!(search_bfs(&g, 0), vec![0, 1, 2, 4, 3]);
    }

    #[test]
    fn test_dfs_skips_duplicate_stack_entries() {
        // 0 -> {1, 2}, 2 -> 1: vertex 1 is pushed twice but reported once.
        let mut g = with_vertices(3, 3);
        g.add_directed_edge(0, 1);
        g.add_directed_edge(0, 2);
        g.add_directed_edge(2, 1);
        assert_eq!(search_dfs(&g, 0), vec![0, 2, 1]);
    }

    #[test]
    fn test_unreachable_vertices_excluded() {
        let mut g = with_vertices(6, 6);
        g.add_undirected_edge(0, 1, 1);
        g.add_undirected_edge(3, 4, 1);
        assert_eq!(search_bfs(&g, 0), vec![0, 1]);
        assert_eq!(search_dfs(&g, 4), vec![4, 3]);
    }

    #[test]
    fn test_consecutive_traversals_independent() {
        let g = make_sample();
        let first = search_dfs(&g, 1);
        let second = search_dfs(&g, 0);
        assert_eq!(first, vec![1, 2]);
        assert_eq!(second, vec![0, 3, 1, 2]);
        assert_eq!(search_dfs(&g, 1), first);
    }

    #[test]
    fn test_reused_visited_set_is_cleared() {
        let g = make_sample();
        let mut visited = VisitedSet::for_graph(&g);
        assert_eq!(search_bfs_with(&g, 0, &mut visited), vec![0, 1, 3, 2]);
        assert_eq!(visited.count(), 4);

        assert_eq!(search_bfs_with(&g, 1, &mut visited), vec![1, 2]);
        assert_eq!(visited.iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_undersized_visited_set_grows() {
        let g = make_chain(100);
        let mut visited = VisitedSet::new(1);
        assert_eq!(search_dfs_with(&g, 0, &mut visited).len(), 100);
        assert_eq!(visited.count(), 100);
    }

    #[test]
    fn test_concurrent_traversals_share_graph() {
        let g = make_cycle(64);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|start| {
                    let g = &g;
                    s.spawn(move || (search_dfs(g, start), search_bfs(g, start)))
                })
                .collect();
            for (start, handle) in handles.into_iter().enumerate() {
                let (dfs, bfs) = handle.join().unwrap();
                assert_eq!(dfs.len(), 64);
                assert_eq!(dfs[0], start);
                assert_eq!(dfs, bfs);
            }
        });
    }

    // --- Shortest path ---

    #[test]
    fn test_path_triangle() {
        let path = shortest_path(&make_triangle(), 0, 2).unwrap();
        assert_eq!(path.vertices, vec![0, 1, 2]);
        assert_eq!(path.total_weight, 5);
        assert_eq!(path.hops(), 2);
    }

    #[test]
    fn test_path_undirected_reverse() {
        let path = shortest_path(&make_triangle(), 2, 0).unwrap();
        assert_eq!(path.vertices, vec![2, 1, 0]);
        assert_eq!(path.total_weight, 5);
    }

    #[test]
    fn test_path_same_vertex() {
        let path = shortest_path(&make_triangle(), 1, 1).unwrap();
        assert_eq!(path.vertices, vec![1]);
        assert_eq!(path.total_weight, 0);
        assert_eq!(path.hops(), 0);
    }

    #[test]
    fn test_path_disconnected() {
        let mut g = with_vertices(4, 4);
        g.add_undirected_edge(0, 1, 2);
        g.add_undirected_edge(2, 3, 2);
        assert_eq!(
            shortest_path(&g, 0, 3),
            Err(GraphError::NoPathExists { from: 0, to: 3 })
        );
    }

    #[test]
    fn test_path_directed_respects_direction() {
        let g = make_chain(4);
        let path = shortest_path(&g, 0, 3).unwrap();
        assert_eq!(path.vertices, vec![0, 1, 2, 3]);
        assert_eq!(path.total_weight, 3 * DEFAULT_WEIGHT);
        assert_eq!(
            shortest_path(&g, 3, 0),
            Err(GraphError::NoPathExists { from: 3, to: 0 })
        );
    }

    #[test]
    fn test_path_weighted_directed() {
        let mut g = with_vertices(4, 4);
        g.add_weighted_directed_edge(0, 1, 1);
        g.add_weighted_directed_edge(1, 3, 20);
        g.add_weighted_directed_edge(0, 2, 5);
        g.add_weighted_directed_edge(2, 3, 5);
        let path = shortest_path(&g, 0, 3).unwrap();
        assert_eq!(path.vertices, vec![0, 2, 3]);
        assert_eq!(path.total_weight, 10);
    }

    #[test]
    fn test_path_prefers_lighter_parallel_edge() {
        let mut g = with_vertices(2, 2);
        g.add_undirected_edge(0, 1, 9);
        g.add_undirected_edge(0, 1, 2);
        assert_eq!(shortest_path(&g, 0, 1).unwrap().total_weight, 2);
    }

    #[test]
    fn test_path_zero_weight_edges() {
        let mut g = with_vertices(3, 3);
        g.add_undirected_edge(0, 1, 0);
        g.add_undirected_edge(1, 2, 0);
        g.add_undirected_edge(0, 2, 1);
        let path = shortest_path(&g, 0, 2).unwrap();
        assert_eq!(path.total_weight, 0);
        assert_eq!(path.vertices, vec![0, 1, 2]);
    }

    #[test]
    fn test_path_more_hops_fewer_weight() {
        let mut g = with_vertices(6, 6);
        g.add_undirected_edge(0, 5, 100);
        for i in 0..5 {
            g.add_undirected_edge(i, i + 1, 3);
        }
        let path = shortest_path(&g, 0, 5).unwrap();
        assert_eq!(path.vertices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(path.total_weight, 15);
    }

    #[test]
    fn test_path_absent_endpoint() {
        let g = with_vertices(4, 2);
        assert_eq!(shortest_path(&g, 0, 3), Err(GraphError::VertexNotFound(3)));
        assert_eq!(shortest_path(&g, 3, 0), Err(GraphError::VertexNotFound(3)));
        assert_eq!(shortest_path(&g, 0, 99), Err(GraphError::VertexNotFound(99)));
    }

    #[test]
    fn test_path_negative_weight_rejected() {
        let mut g = make_triangle();
        g.add_weighted_directed_edge(2, 1, -3);
        assert_eq!(
            shortest_path(&g, 0, 2),
            Err(GraphError::InvalidWeight {
                from: 2,
                to: 1,
                weight: -3
            })
        );
    }

    #[test]
    fn test_path_large_weights_compare_exactly() {
        // Via 1 the total is MAX + 5; via 2 it is exactly MAX.
        let mut g = with_vertices(4, 4);
        g.add_undirected_edge(0, 1, 5);
        g.add_undirected_edge(1, 3, Weight::MAX);
        g.add_undirected_edge(0, 2, Weight::MAX - 1);
        g.add_undirected_edge(2, 3, 1);
        let path = shortest_path(&g, 0, 3).unwrap();
        assert_eq!(path.vertices, vec![0, 2, 3]);
        assert_eq!(path.total_weight, Weight::MAX);
    }

    #[test]
    fn test_path_total_above_max_is_overflow() {
        let mut g = with_vertices(3, 3);
        g.add_undirected_edge(0, 1, Weight::MAX);
        g.add_undirected_edge(1, 2, Weight::MAX);
        assert_eq!(
            shortest_path(&g, 0, 2),
            Err(GraphError::WeightOverflow { from: 0, to: 2 })
        );
        assert_eq!(shortest_path(&g, 0, 1).unwrap().total_weight, Weight::MAX);
    }
}
