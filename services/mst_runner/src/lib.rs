//! GHS MST Runner
//!
//! Reads a graph file, runs the distributed GHS protocol over it with one
//! actor per vertex, writes the resulting tree, and optionally checks it
//! against the Kruskal reference and appends an experiment results row.
//!
//! The `ghs-mst` binary is a thin CLI over [`execute`].

pub mod io;
pub mod verify;

use anyhow::{Context, Result};
use ghs_actors::{GhsSystem, MetricsSnapshot};
use ghs_config::RunConfig;
use ghs_types::{Weight, WeightedEdge};
use std::time::Duration;
use tracing::{info, warn};

pub use io::{append_result, format_tree, read_topology, write_tree, ResultRow};
pub use verify::{kruskal, verify_tree, TreeMismatch};

/// What one run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub tree: Vec<WeightedEdge>,
    pub total_weight: Weight,
    pub vertices: usize,
    pub edges: usize,
    pub metrics: MetricsSnapshot,
    pub elapsed: Duration,
    /// Reference comparison; `None` when the tree matches Kruskal
    pub mismatch: Option<TreeMismatch>,
}

impl RunOutcome {
    pub fn messages(&self) -> u64 {
        self.metrics.total_sent()
    }
}

/// Run the full pipeline described by `config`
pub async fn execute(config: &RunConfig) -> Result<RunOutcome> {
    let topology = read_topology(&config.input)?;
    let vertices = topology.vertex_count();
    let edges = topology.edge_count();
    let initiators = config.initiator_count(vertices);
    info!(
        input = %config.input.display(),
        vertices,
        edges,
        initiators,
        "Graph loaded"
    );

    let reference = topology.clone();
    let report = GhsSystem::new(topology, initiators)?
        .run()
        .await
        .context("GHS run failed")?;
    let tree = report.tree_edges()?;
    if tree.len() != vertices.saturating_sub(1) {
        anyhow::bail!(
            "Run produced {} branch edges for {} vertices",
            tree.len(),
            vertices
        );
    }

    write_tree(&config.output, &tree)?;
    info!(output = %config.output.display(), tree_edges = tree.len(), "Tree written");

    let mismatch = verify_tree(&reference, &tree).err();
    match &mismatch {
        Some(m) if config.verify => anyhow::bail!("Tree does not match the reference MST: {m}"),
        Some(m) => warn!(error = %m, "Tree does not match the reference MST"),
        None => info!("Tree matches the reference MST"),
    }

    if let Some(results) = &config.results {
        let row = ResultRow {
            input: config.input.display().to_string(),
            messages: report.message_count(),
            vertices,
            edges,
        };
        append_result(results, &row)?;
    }

    let total_weight = verify::tree_weight(&tree);
    Ok(RunOutcome {
        tree,
        total_weight,
        vertices,
        edges,
        metrics: report.metrics,
        elapsed: report.elapsed,
        mismatch,
    })
}
