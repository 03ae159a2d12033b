//! Graph and tree file formats
//!
//! Input: vertex count on the first non-empty line, then one `(u, v, w)` edge
//! per line. Output: one `(u, v, w)` line per tree edge, lightest first.

use anyhow::{Context, Result};
use ghs_types::{Topology, WeightedEdge};
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

pub fn read_topology(path: &Path) -> Result<Topology> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph from {}", path.display()))?;
    text.parse::<Topology>()
        .with_context(|| format!("Invalid graph in {}", path.display()))
}

/// Render tree edges in output order
pub fn format_tree(tree: &[WeightedEdge]) -> String {
    let mut sorted = tree.to_vec();
    sorted.sort_by(|a, b| a.weight.total_cmp(&b.weight));

    let mut out = String::new();
    for edge in &sorted {
        let _ = writeln!(out, "{edge}");
    }
    out
}

pub fn write_tree(path: &Path, tree: &[WeightedEdge]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, format_tree(tree))
        .with_context(|| format!("Failed to write tree to {}", path.display()))
}

/// One experiment row: `input,messages,vertices,edges`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub input: String,
    pub messages: u64,
    pub vertices: usize,
    pub edges: usize,
}

impl ResultRow {
    pub fn to_csv(&self) -> String {
        format!(
            "{},{},{},{}",
            self.input, self.messages, self.vertices, self.edges
        )
    }
}

pub fn append_result(path: &Path, row: &ResultRow) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open results file {}", path.display()))?;
    writeln!(file, "{}", row.to_csv())
        .with_context(|| format!("Failed to append to {}", path.display()))
}
