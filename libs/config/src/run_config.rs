//! Run Configuration Module
//!
//! Loads [`RunConfig`] from an optional TOML file with `GHS_` environment
//! overrides.

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Logging detail selected for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Run summary only
    Basic,
    /// Actor lifecycle events
    #[default]
    Info,
    /// Every handled message
    Debug,
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Verbosity::Basic),
            "info" => Ok(Verbosity::Info),
            "debug" => Ok(Verbosity::Debug),
            other => Err(format!(
                "unknown verbosity '{}' (expected basic, info or debug)",
                other
            )),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verbosity::Basic => "basic",
            Verbosity::Info => "info",
            Verbosity::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// Parameters of one MST run
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Graph input file
    pub input: PathBuf,

    /// Tree output file
    pub output: PathBuf,

    /// Number of vertices that wake spontaneously; every vertex when unset
    pub initiators: Option<usize>,

    pub verbosity: Verbosity,

    /// Experiment results file; one CSV row is appended per run
    pub results: Option<PathBuf>,

    /// Compare the tree against the Kruskal reference and fail on mismatch
    pub verify: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("files/inp.txt"),
            output: PathBuf::from("files/out.txt"),
            initiators: None,
            verbosity: Verbosity::Info,
            results: None,
            verify: false,
        }
    }
}

impl RunConfig {
    /// Load configuration from an optional file with environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading run config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        // Override with environment variables (GHS_ prefix)
        builder = builder.add_source(Environment::with_prefix("GHS").try_parsing(true));

        let config = builder
            .build()
            .context("Failed to build configuration")?;

        let run: RunConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        run.validate()?;

        debug!(?run, "Run configuration resolved");
        Ok(run)
    }

    /// Reject parameters that can never produce a run
    pub fn validate(&self) -> Result<()> {
        if self.initiators == Some(0) {
            bail!("initiators must be at least 1: with no spontaneous wakeup no vertex ever starts");
        }
        if self.input == self.output {
            bail!("input and output must be different files ({:?})", self.input);
        }
        Ok(())
    }

    /// Number of spontaneous initiators for a graph of `vertex_count` vertices
    pub fn initiator_count(&self, vertex_count: usize) -> usize {
        self.initiators
            .unwrap_or(vertex_count)
            .min(vertex_count)
    }

    /// Render as TOML, suitable as a starting config file
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Convenience function to load configuration with defaults
pub fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    RunConfig::load(path)
}
