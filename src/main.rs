#![allow(dead_code)]
// Used to get build time information
use shadow_rs::shadow;
shadow!(build);

mod auth;
mod cli;
mod config;
mod deploy;
mod execution;
mod http;
mod logging;
mod metrics;
mod storage;
mod types;
mod validate;

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Commands, RunArgs};
use crate::config::SystemConfig;
use crate::types::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Try to load the config early so logging can pick up its settings;
    // the run/validate commands report their own load errors properly.
    let system_config = match &cli.command {
        Some(Commands::Version) => None,
        _ => SystemConfig::load_from_file(&cli.config).ok(),
    };

    let log_level_override = if cli.log_level.is_some() || cli.verbose || cli.quiet {
        Some(cli.log_level_to_str())
    } else {
        None
    };

    crate::logging::init(
        log_level_override,
        cli.log_format_override(),
        system_config.as_ref(),
    )?;

    crate::metrics::init_metrics();

    info!("Starting Droplift");

    match cli.command.clone().unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => cli::run_server(cli, args, system_config).await,
        Commands::Validate => cli::validate_config(cli, system_config).await,
        Commands::Version => cli::show_version().await,
    }
}
