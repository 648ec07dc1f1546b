//! Caller-scoped visited tracking for traversals.
//!
//! Visited state is kept out of the graph so traversals only need `&Graph`:
//! several traversals can share one graph, and a caller can keep a set
//! around to inspect which vertices the last traversal reached.

use crate::graph::{Graph, VertexId};

const WORD_BITS: usize = u64::BITS as usize;

/// A dense, word-packed visited set covering ids `0..len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedSet {
    words: Vec<u64>,
    len: usize,
}

impl VisitedSet {
    /// A set able to track ids `0..len`, all unvisited.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// A set sized to `graph`'s capacity.
    pub fn for_graph(graph: &Graph) -> Self {
        Self::new(graph.capacity())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mark every id unvisited.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Grow to cover at least `len` ids. Existing marks are kept.
    pub fn ensure_len(&mut self, len: usize) {
        if len > self.len {
            self.words.resize(len.div_ceil(WORD_BITS), 0);
            self.len = len;
        }
    }

    /// Mark `id` visited. Returns `true` iff it was not visited before.
    /// Ids beyond `len` are never recorded and return `false`.
    pub fn visit(&mut self, id: VertexId) -> bool {
        if id >= self.len {
            return false;
        }
        let (word, mask) = (id / WORD_BITS, 1u64 << (id % WORD_BITS));
        let fresh = self.words[word] & mask == 0;
        self.words[word] |= mask;
        fresh
    }

    pub fn is_visited(&self, id: VertexId) -> bool {
        id < self.len && self.words[id / WORD_BITS] & (1u64 << (id % WORD_BITS)) != 0
    }

    /// Number of visited ids.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Visited ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.len).filter(move |&id| self.is_visited(id))
    }
}
