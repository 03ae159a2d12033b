//! # Input Graph Model
//!
//! Parsed, validated description of the weighted undirected graph the actors
//! are wired from. The text format is:
//!
//! ```text
//! 4
//! (0, 1, 10)
//! (0, 2, 6)
//! ```
//!
//! First non-empty line is the vertex count, every following non-empty line is
//! one edge `(u, v, w)`. Parentheses are optional and fields may be separated
//! by commas, whitespace or both.
//!
//! Validation rejects everything the protocol cannot run on: out of range
//! endpoints, self loops, non-finite weights, duplicate weights (the
//! `test`/`accept` tie-break needs globally unique weights) and disconnected
//! graphs (no actor would ever see the termination condition).

use crate::common::errors::{GhsError, Result};
use crate::common::identifiers::{EdgeId, VertexId, Weight};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// One undirected input edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedEdge {
    pub id: EdgeId,
    pub u: VertexId,
    pub v: VertexId,
    pub weight: Weight,
}

impl WeightedEdge {
    /// Endpoint opposite `vertex`, if `vertex` is an endpoint at all
    pub fn other(&self, vertex: VertexId) -> Option<VertexId> {
        if vertex == self.u {
            Some(self.v)
        } else if vertex == self.v {
            Some(self.u)
        } else {
            None
        }
    }
}

impl fmt::Display for WeightedEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.u.0, self.v.0, self.weight)
    }
}

/// Validated weighted, connected, undirected graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    vertex_count: usize,
    edges: Vec<WeightedEdge>,
}

impl Topology {
    /// Build from raw `(u, v, w)` triples.
    ///
    /// Errors report line numbers as they would appear in the text format
    /// (the vertex count occupies line 1).
    pub fn new(vertex_count: usize, edges: &[(usize, usize, Weight)]) -> Result<Self> {
        let raw = edges
            .iter()
            .enumerate()
            .map(|(i, &(u, v, w))| (i + 2, u, v, w))
            .collect::<Vec<_>>();
        Self::from_numbered(vertex_count, raw)
    }

    fn from_numbered(vertex_count: usize, raw: Vec<(usize, usize, usize, Weight)>) -> Result<Self> {
        if vertex_count == 0 {
            return Err(GhsError::EmptyGraph);
        }

        let mut edges = Vec::with_capacity(raw.len());
        let mut seen_weights: HashMap<u64, usize> = HashMap::with_capacity(raw.len());

        for (line, u, v, weight) in raw {
            for vertex in [u, v] {
                if vertex >= vertex_count {
                    return Err(GhsError::VertexOutOfRange {
                        line,
                        vertex,
                        vertex_count,
                    });
                }
            }
            if u == v {
                return Err(GhsError::SelfLoop { line, vertex: u });
            }
            if !weight.is_finite() {
                return Err(GhsError::InvalidWeight {
                    line,
                    weight: weight.to_string(),
                });
            }
            // -0.0 and 0.0 compare equal, so normalise before hashing the bits
            let key = if weight == 0.0 { 0.0f64.to_bits() } else { weight.to_bits() };
            if let Some(&first_line) = seen_weights.get(&key) {
                return Err(GhsError::DuplicateWeight {
                    weight,
                    first_line,
                    line,
                });
            }
            seen_weights.insert(key, line);

            edges.push(WeightedEdge {
                id: EdgeId::new(edges.len()),
                u: VertexId::new(u),
                v: VertexId::new(v),
                weight,
            });
        }

        let topology = Self { vertex_count, edges };
        let components = topology.component_count();
        if components > 1 {
            return Err(GhsError::Disconnected { components });
        }
        Ok(topology)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[WeightedEdge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&WeightedEdge> {
        self.edges.get(id.index())
    }

    /// Edges incident to `vertex`, in input order
    pub fn incident(&self, vertex: VertexId) -> impl Iterator<Item = &WeightedEdge> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.u == vertex || e.v == vertex)
    }

    /// Sum of weights of the given edges
    pub fn total_weight<'a>(&self, ids: impl IntoIterator<Item = &'a EdgeId>) -> Weight {
        ids.into_iter()
            .filter_map(|id| self.edge(*id))
            .map(|e| e.weight)
            .sum()
    }

    fn component_count(&self) -> usize {
        let mut sets = DisjointSet::new(self.vertex_count);
        for edge in &self.edges {
            sets.union(edge.u.index(), edge.v.index());
        }
        sets.set_count()
    }
}

impl FromStr for Topology {
    type Err = GhsError;

    fn from_str(input: &str) -> Result<Self> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (header_line, header) = lines.next().ok_or(GhsError::EmptyGraph)?;
        let vertex_count = header.parse::<usize>().map_err(|e| {
            GhsError::malformed(header_line, format!("invalid vertex count '{}': {}", header, e))
        })?;

        let mut raw = Vec::new();
        for (line_no, line) in lines {
            raw.push(parse_edge_line(line_no, line)?);
        }

        Self::from_numbered(vertex_count, raw)
    }
}

fn parse_edge_line(line_no: usize, line: &str) -> Result<(usize, usize, usize, Weight)> {
    let body = line.trim_start_matches('(').trim_end_matches(')');
    let fields = body
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>();

    if fields.len() != 3 {
        return Err(GhsError::malformed(
            line_no,
            format!("expected (u, v, w), found '{}'", line),
        ));
    }

    let vertex = |field: &str| {
        field.parse::<usize>().map_err(|e| {
            GhsError::malformed(line_no, format!("invalid vertex id '{}': {}", field, e))
        })
    };
    let u = vertex(fields[0])?;
    let v = vertex(fields[1])?;
    let weight = fields[2].parse::<Weight>().map_err(|e| {
        GhsError::malformed(line_no, format!("invalid weight '{}': {}", fields[2], e))
    })?;

    Ok((line_no, u, v, weight))
}

/// Union-find over `0..n` with path halving and union by size
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
    sets: usize,
}

impl DisjointSet {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
            sets: n,
        }
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the sets of `a` and `b`. Returns false if already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
        self.sets -= 1;
        true
    }

    pub fn set_count(&self) -> usize {
        self.sets
    }
}
