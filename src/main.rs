//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `sub_curator` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use sub_curator::initialization::init_logger_with;
use sub_curator::{run_cycle, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from(Opt::parse());

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let package_path = config.package_path.clone();
    match run_cycle(config).await {
        Ok(report) => {
            println!(
                "✅ Probed {} of {} source{} ({} succeeded, {} failed, {} dead), packaged {} of {} unique nodes in {:.1}s",
                report.dispatched,
                report.total_sources,
                if report.total_sources == 1 { "" } else { "s" },
                report.succeeded,
                report.failed,
                report.dead,
                report.emitted_nodes,
                report.unique_nodes,
                report.elapsed_seconds
            );
            println!("Package saved in {}", package_path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("sub_curator error: {:#}", e);
            process::exit(1);
        }
    }
}
