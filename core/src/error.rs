use thiserror::Error;

use crate::graph::{VertexId, Weight};

/// Errors reported by the strict graph operations and by shortest path.
///
/// The lenient mutators (`add_vertex`, `add_directed_edge`, ...) never
/// surface these; they log at debug level and leave the graph unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Identifier outside `[0, capacity)`.
    #[error("vertex id {id} is out of range for capacity {capacity}")]
    OutOfRange { id: VertexId, capacity: usize },

    /// The slot exists but holds no vertex.
    #[error("no vertex at position {0}")]
    VertexNotFound(VertexId),

    #[error("vertex {0} already exists")]
    VertexAlreadyExists(VertexId),

    #[error("no path from {from} to {to}")]
    NoPathExists { from: VertexId, to: VertexId },

    /// Shortest path requires non-negative edge weights.
    #[error("edge {from} -> {to} has negative weight {weight}")]
    InvalidWeight {
        from: VertexId,
        to: VertexId,
        weight: Weight,
    },

    /// The lightest path exists but its total weight does not fit in `Weight`.
    #[error("shortest path from {from} to {to} has a total weight above {max}", max = Weight::MAX)]
    WeightOverflow { from: VertexId, to: VertexId },
}

pub type Result<T> = std::result::Result<T, GraphError>;
