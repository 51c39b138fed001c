//! Binary entry point for the archive downloader.

// Clippy lints - strict for binary code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]

mod cli;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bing_image_archiver::{Config, Orchestrator, RunSummary};

use cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    config.retry_failed |= args.retry_failed;

    let orchestrator = Orchestrator::from_config(config);
    match orchestrator.run().await.context("archive run failed")? {
        RunSummary::AlreadyUpToDate => {
            info!("already up to date");
        }
        RunSummary::Completed { report, retry } => {
            info!(
                total = report.total_files,
                downloaded = report.files_downloaded,
                failed = report.failed.len(),
                "run completed"
            );
            if let Some(retry) = retry {
                info!(
                    attempted = retry.attempted,
                    recovered = retry.recovered,
                    still_failed = retry.still_failed,
                    "retry pass completed"
                );
            }
        }
    }

    Ok(())
}
