//! Reference MST and tree checks
//!
//! [`kruskal`] is the sequential reference the distributed result is compared
//! against. With unique weights the MST is unique, so a correct run yields the
//! same edge set and the same total weight.

use ghs_types::{DisjointSet, Topology, Weight, WeightedEdge};
use thiserror::Error;

/// Ways a distributed tree can disagree with the reference
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TreeMismatch {
    #[error("Tree has {actual} edges, expected {expected}")]
    EdgeCount { expected: usize, actual: usize },

    #[error("Tree edge {edge} closes a cycle")]
    Cycle { edge: String },

    #[error("Tree leaves {components} components unconnected")]
    NotSpanning { components: usize },

    #[error("Tree weight {actual} differs from reference weight {expected}")]
    Weight { expected: Weight, actual: Weight },
}

/// Minimum spanning tree by Kruskal's algorithm, lightest edge first
pub fn kruskal(topology: &Topology) -> Vec<WeightedEdge> {
    let mut edges = topology.edges().to_vec();
    edges.sort_by(|a, b| a.weight.total_cmp(&b.weight));

    let mut sets = DisjointSet::new(topology.vertex_count());
    edges
        .into_iter()
        .filter(|e| sets.union(e.u.index(), e.v.index()))
        .collect()
}

pub fn tree_weight(tree: &[WeightedEdge]) -> Weight {
    let mut weights: Vec<_> = tree.iter().map(|e| e.weight).collect();
    weights.sort_by(|a, b| a.total_cmp(b));
    weights.iter().sum()
}

/// Check `tree` is a spanning tree of `topology` with minimum weight
pub fn verify_tree(topology: &Topology, tree: &[WeightedEdge]) -> Result<Weight, TreeMismatch> {
    let n = topology.vertex_count();
    let expected_edges = n.saturating_sub(1);
    if tree.len() != expected_edges {
        return Err(TreeMismatch::EdgeCount {
            expected: expected_edges,
            actual: tree.len(),
        });
    }

    let mut sets = DisjointSet::new(n);
    for edge in tree {
        if !sets.union(edge.u.index(), edge.v.index()) {
            return Err(TreeMismatch::Cycle {
                edge: edge.to_string(),
            });
        }
    }
    if sets.set_count() != 1 {
        return Err(TreeMismatch::NotSpanning {
            components: sets.set_count(),
        });
    }

    let expected = tree_weight(&kruskal(topology));
    let actual = tree_weight(tree);
    if (expected - actual).abs() > 1e-9 * expected.abs().max(1.0) {
        return Err(TreeMismatch::Weight { expected, actual });
    }
    Ok(actual)
}
