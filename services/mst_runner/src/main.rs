//! GHS minimum spanning tree runner
//!
//! Usage:
//!   ghs-mst --input files/inp.txt --output files/out.txt
//!   ghs-mst --config run.toml --verify --results files/results.txt
//!   ghs-mst --dump-config > run.toml

use anyhow::Result;
use clap::Parser;
use ghs_config::{RunConfig, Verbosity};
use mst_runner::execute;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ghs-mst")]
#[command(about = "Distributed minimum spanning tree with one actor per vertex")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Graph input file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Tree output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of vertices that wake up spontaneously
    #[arg(short = 'n', long)]
    initiators: Option<usize>,

    /// Log detail (basic, info, debug)
    #[arg(short, long)]
    verbosity: Option<Verbosity>,

    /// Append an experiment row to this file
    #[arg(long)]
    results: Option<PathBuf>,

    /// Fail if the tree differs from the Kruskal reference
    #[arg(long)]
    verify: bool,

    /// Print the resolved configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

impl Args {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if self.initiators.is_some() {
            config.initiators = self.initiators;
        }
        if let Some(verbosity) = self.verbosity {
            config.verbosity = verbosity;
        }
        if self.results.is_some() {
            config.results = self.results.clone();
        }
        config.verify |= self.verify;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = RunConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    init_logging(config.verbosity);

    info!(
        input = %config.input.display(),
        output = %config.output.display(),
        "Starting GHS MST run"
    );

    match execute(&config).await {
        Ok(outcome) => {
            info!(
                vertices = outcome.vertices,
                edges = outcome.edges,
                tree_edges = outcome.tree.len(),
                total_weight = outcome.total_weight,
                messages = outcome.messages(),
                deferred = outcome.metrics.total_deferred(),
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                "Run complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            Err(e)
        }
    }
}

fn init_logging(verbosity: Verbosity) {
    let directives = match verbosity {
        Verbosity::Basic => "warn,ghs_mst=info,mst_runner=info",
        Verbosity::Info => "info",
        Verbosity::Debug => "debug",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
