use tracing::debug;

use crate::error::{GraphError, Result};

/// Vertex identifier. Doubles as the vertex's slot index.
pub type VertexId = usize;

/// Edge weight. Signed so negative weights can be stored and later rejected
/// by shortest path.
pub type Weight = i64;

/// Weight assigned to directed edges added without an explicit weight.
pub const DEFAULT_WEIGHT: Weight = 1;

/// A vertex record. Its id always equals the slot it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    pub id: VertexId,
}

/// An outgoing adjacency entry: the target slot and the weight of the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub target: VertexId,
    pub weight: Weight,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    vertex: Option<Vertex>,
    adjacent: Vec<Edge>,
}

/// Fixed-capacity graph: a table of slots indexed by vertex id.
///
/// Every slot owns an optional vertex and an adjacency list of [`Edge`]s.
/// Adjacency entries hold indices only, so the table is the sole owner of
/// vertex storage. Capacity never changes after construction.
///
/// Parallel edges are kept: adding the same edge twice yields two entries.
#[derive(Debug, Clone)]
pub struct Graph {
    slots: Vec<Slot>,
    vertex_count: usize,
    edge_count: usize,
}

impl Graph {
    /// Create a graph with `capacity` empty slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Slot::default(); capacity],
            vertex_count: 0,
            edge_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn check_range(&self, id: VertexId) -> Result<()> {
        if id < self.slots.len() {
            Ok(())
        } else {
            Err(GraphError::OutOfRange {
                id,
                capacity: self.slots.len(),
            })
        }
    }

    /// Range check followed by presence check.
    pub(crate) fn require_vertex(&self, id: VertexId) -> Result<()> {
        self.check_range(id)?;
        if self.slots[id].vertex.is_some() {
            Ok(())
        } else {
            Err(GraphError::VertexNotFound(id))
        }
    }

    /// Insert a vertex at slot `id`, failing if the id is out of range or
    /// the slot is already occupied.
    pub fn try_add_vertex(&mut self, id: VertexId) -> Result<()> {
        self.check_range(id)?;
        let slot = &mut self.slots[id];
        if slot.vertex.is_some() {
            return Err(GraphError::VertexAlreadyExists(id));
        }
        slot.vertex = Some(Vertex { id });
        self.vertex_count += 1;
        Ok(())
    }

    /// Insert a vertex at slot `id`. Out-of-range ids and occupied slots are
    /// ignored. Returns whether a vertex was inserted.
    pub fn add_vertex(&mut self, id: VertexId) -> bool {
        lenient("add_vertex", self.try_add_vertex(id))
    }

    /// Add a directed edge `source -> destination` with [`DEFAULT_WEIGHT`].
    pub fn try_add_directed_edge(&mut self, source: VertexId, destination: VertexId) -> Result<()> {
        self.try_add_weighted_directed_edge(source, destination, DEFAULT_WEIGHT)
    }

    /// Add a directed edge `source -> destination` carrying `weight`.
    /// Only `source`'s adjacency list changes.
    pub fn try_add_weighted_directed_edge(
        &mut self,
        source: VertexId,
        destination: VertexId,
        weight: Weight,
    ) -> Result<()> {
        self.require_vertex(source)?;
        self.require_vertex(destination)?;
        self.slots[source].adjacent.push(Edge {
            target: destination,
            weight,
        });
        self.edge_count += 1;
        Ok(())
    }

    /// Lenient form of [`Graph::try_add_directed_edge`].
    pub fn add_directed_edge(&mut self, source: VertexId, destination: VertexId) -> bool {
        lenient(
            "add_directed_edge",
            self.try_add_directed_edge(source, destination),
        )
    }

    /// Lenient form of [`Graph::try_add_weighted_directed_edge`].
    pub fn add_weighted_directed_edge(
        &mut self,
        source: VertexId,
        destination: VertexId,
        weight: Weight,
    ) -> bool {
        lenient(
            "add_weighted_directed_edge",
            self.try_add_weighted_directed_edge(source, destination, weight),
        )
    }

    /// Add an undirected weighted edge: `destination` is appended to
    /// `source`'s list and `source` to `destination`'s, both with `weight`.
    ///
    /// Both endpoints are validated before either list is touched, so a
    /// failure never leaves a one-sided edge behind.
    pub fn try_add_undirected_edge(
        &mut self,
        source: VertexId,
        destination: VertexId,
        weight: Weight,
    ) -> Result<()> {
        self.require_vertex(source)?;
        self.require_vertex(destination)?;
        self.slots[source].adjacent.push(Edge {
            target: destination,
            weight,
        });
        self.slots[destination].adjacent.push(Edge {
            target: source,
            weight,
        });
        self.edge_count += 2;
        Ok(())
    }

    /// Lenient form of [`Graph::try_add_undirected_edge`].
    pub fn add_undirected_edge(
        &mut self,
        source: VertexId,
        destination: VertexId,
        weight: Weight,
    ) -> bool {
        lenient(
            "add_undirected_edge",
            self.try_add_undirected_edge(source, destination, weight),
        )
    }

    /// Outgoing edges of slot `id`. Empty for out-of-range ids and for
    /// slots without a vertex.
    pub fn get_adjacent(&self, id: VertexId) -> &[Edge] {
        self.slots
            .get(id)
            .map(|s| s.adjacent.as_slice())
            .unwrap_or(&[])
    }

    /// Target ids of the outgoing edges of `id`, in insertion order.
    pub fn neighbors(&self, id: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.get_adjacent(id).iter().map(|e| e.target)
    }

    pub fn out_degree(&self, id: VertexId) -> usize {
        self.get_adjacent(id).len()
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertex(id).is_some()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.slots.get(id).and_then(|s| s.vertex.as_ref())
    }

    /// Present vertices in id order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.slots.iter().filter_map(|s| s.vertex.as_ref())
    }

    /// Every adjacency entry as `(source, edge)`, in slot order.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, &Edge)> {
        self.slots
            .iter()
            .enumerate()
            .flat_map(|(id, s)| s.adjacent.iter().map(move |e| (id, e)))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of adjacency entries. An undirected edge counts twice.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let table = self.slots.capacity() * size_of::<Slot>();
        let lists: usize = self
            .slots
            .iter()
            .map(|s| s.adjacent.capacity() * size_of::<Edge>())
            .sum();

        size_of::<Self>() + table + lists
    }
}

fn lenient(op: &'static str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            debug!(op, %err, "graph mutation ignored");
            false
        }
    }
}
