//! # gaza-cpi
//!
//! Command-line entry point: read the CPI workbook and the curation tables, write the five
//! long/wide CSV outputs.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gaza_cpi::config::PipelineConfig;
use gaza_cpi::pipeline::{
    self, CompositeObserver, FileObserver, PipelineObserver, PipelineOptions, StdErrObserver, TracingObserver,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Extract Gaza Strip CPI series from a PCBS workbook.
#[derive(Parser)]
#[command(name = "gaza-cpi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source workbook
    #[arg(long, value_name = "FILE")]
    workbook: Option<PathBuf>,

    /// Directory holding the curation tables
    #[arg(long, value_name = "DIR")]
    extras_dir: Option<PathBuf>,

    /// Directory receiving the output CSV files
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// JSON file overriding layouts and paths
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Append stage events to this file
    #[arg(long, value_name = "FILE")]
    event_log: Option<PathBuf>,

    /// Print stage events to stderr as plain lines
    #[arg(long)]
    stderr_events: bool,

    /// Enable debug output
    #[arg(short, long)]
    verbose: bool,
}

/// Stage events always reach `tracing`; the file and stderr sinks are opt-in.
fn observer_for(cli: &Cli) -> CompositeObserver {
    let mut observers: Vec<Arc<dyn PipelineObserver>> = vec![Arc::new(TracingObserver)];
    if let Some(path) = &cli.event_log {
        observers.push(Arc::new(FileObserver::new(path)));
    }
    if cli.stderr_events {
        observers.push(Arc::new(StdErrObserver));
    }
    CompositeObserver::new(observers)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let options = PipelineOptions {
        observer: Some(Arc::new(observer_for(&cli))),
        ..Default::default()
    };

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(workbook) = cli.workbook {
        config.workbook_path = workbook;
    }
    if let Some(dir) = cli.extras_dir {
        config = config.with_extras_dir(dir);
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    info!(workbook = %config.workbook_path.display(), "starting");
    let summary = pipeline::run(&config, &options)
        .with_context(|| format!("failed to process {}", config.workbook_path.display()))?;
    print!("{summary}");
    Ok(())
}
