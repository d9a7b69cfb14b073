//! Main entry point for the metagenomics_summarize application.

use anyhow::Result;
use clap::Parser;
use log::info;
use metagenomics_summarize::cli::{run_cli, Cli};

/// Main function: parses arguments and dispatches to the selected tool.
fn main() -> Result<()> {
    // Initialize logging; RUST_LOG=info shows per-stage progress
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Parse command line arguments
    let cli = Cli::parse();
    info!("Starting with arguments: {:?}", cli);

    // Run CLI
    run_cli(cli)
}
