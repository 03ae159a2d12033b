//! # GHS Run Configuration
//!
//! Process parameters for the minimum spanning tree runner: where to read the
//! graph, where to write the tree, how many vertices wake spontaneously and
//! how much to log. None of these affect the protocol outcome.
//!
//! ## Layering
//!
//! 1. Built-in defaults ([`RunConfig::default`])
//! 2. Optional TOML file
//! 3. `GHS_*` environment variables (`GHS_INITIATORS=4`, `GHS_VERBOSITY=debug`)
//!
//! Command line flags are applied on top by the runner.
//!
//! ```toml
//! input = "files/inp.txt"
//! output = "files/out.txt"
//! initiators = 3
//! verbosity = "info"
//! results = "files/results.txt"
//! verify = true
//! ```

pub mod run_config;

pub use run_config::{load_config, RunConfig, Verbosity};
