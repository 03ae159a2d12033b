//! # Identifiers and Scalar Aliases
//!
//! Typed wrappers for the two kinds of index that flow through the protocol.
//! An [`EdgeId`] is global (the position of the edge in the input file) and is
//! shared by both endpoint proxies of that edge; a [`VertexId`] names an actor.
//! Keeping them distinct stops an edge index being used where a vertex index is
//! expected, which is the classic wiring bug in a graph of mailboxes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Edge weight. Must be finite and globally unique across the graph.
pub type Weight = f64;

/// Fragment name: the weight of the core edge that founded the fragment.
pub type FragmentName = f64;

/// Fragment level, incremented on every equal-level merge.
pub type Level = u32;

/// Sentinel for "no outgoing edge found".
pub const INFINITE_WEIGHT: Weight = f64::INFINITY;

/// Global identity of an undirected edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl EdgeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge-{}", self.0)
    }
}

/// Vertex (actor) identity, 0-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub usize);

impl VertexId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vertex-{}", self.0)
    }
}
