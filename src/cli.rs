use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, instrument};

use crate::config::SystemConfig;
use crate::types::Result;

#[derive(Parser)]
#[command(name = "droplift")]
#[command(about = "A lightweight artifact deployment receiver")]
#[command(long_about = "
A single-binary HTTP service that accepts authenticated artifact uploads,
stores them, and runs a locally-configured deployment script.
")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "/etc/droplift/config.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run the deployment receiver server (default if no subcommand given)
    Run(RunArgs),
    /// Validate the configuration file
    Validate,
    /// Show detailed version and build information
    Version,
}

#[derive(Args, Clone, Default)]
pub struct RunArgs {
    /// Override listen address (format: "host:port")
    #[arg(long)]
    pub listen: Option<String>,

    /// Set log format
    #[arg(long)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Get effective log level considering verbose/quiet flags
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else if self.quiet {
            LogLevel::Error
        } else {
            self.log_level.clone().unwrap_or(LogLevel::Info)
        }
    }

    /// Convert LogLevel enum to string for logging module
    pub fn log_level_to_str(&self) -> &'static str {
        match self.effective_log_level() {
            LogLevel::Trace => crate::logging::level::TRACE,
            LogLevel::Debug => crate::logging::level::DEBUG,
            LogLevel::Info => crate::logging::level::INFO,
            LogLevel::Warn => crate::logging::level::WARN,
            LogLevel::Error => crate::logging::level::ERROR,
        }
    }

    /// Get log format override from CLI arguments
    pub fn log_format_override(&self) -> Option<&'static str> {
        match &self.command {
            Some(Commands::Run(args)) => args.log_format.as_ref().map(|fmt| match fmt {
                LogFormat::Json => crate::logging::format::JSON,
                LogFormat::Pretty => crate::logging::format::PRETTY,
            }),
            _ => None,
        }
    }
}

/// Run the deployment receiver server
#[instrument(skip(cli, args, system_config))]
pub async fn run_server(
    cli: Cli,
    args: RunArgs,
    system_config: Option<SystemConfig>,
) -> Result<()> {
    let mut system_config = if let Some(config) = system_config {
        config
    } else {
        info!("Loading configuration...");
        SystemConfig::load_from_file(&cli.config)?
    };

    if let Some(listen) = args.listen {
        system_config.server.listen = listen;
    }
    system_config.validate()?;

    info!(
        config_path = %cli.config.display(),
        "Configuration loaded successfully"
    );

    info!(
        listen = %system_config.server.listen,
        artifact_dir = %system_config.deploy.artifact_dir,
        mode = %system_config.deploy.mode,
        "Starting server"
    );

    let shutdown_signal = setup_shutdown_signal();

    crate::http::start_server(system_config, shutdown_signal).await?;
    Ok(())
}

/// Validate the configuration file
#[instrument(skip(cli, system_config))]
pub async fn validate_config(cli: Cli, system_config: Option<SystemConfig>) -> Result<()> {
    info!("Validating configuration file...");

    let config = if let Some(config) = system_config {
        config
    } else {
        SystemConfig::load_from_file(&cli.config)?
    };

    match config.validate() {
        Ok(()) => info!(
            config_path = %cli.config.display(),
            "Configuration is valid"
        ),
        Err(e) => {
            error!(
                config_path = %cli.config.display(),
                error = %e,
                "Configuration validation failed"
            );
            return Err(e);
        }
    }

    // The script only has to exist by the time a request arrives, so a
    // missing file is a warning here, not an error.
    if let Some(script) = config.deploy.script_path() {
        if std::path::Path::new(script).exists() {
            info!(script = %script, mode = %config.deploy.mode, "Deployment script found");
        } else {
            tracing::warn!(
                script = %script,
                mode = %config.deploy.mode,
                "Deployment script does not exist yet"
            );
        }
    }

    info!("Configuration file is valid");
    Ok(())
}

/// Show version and build information
#[instrument]
pub async fn show_version() -> Result<()> {
    println!("Droplift {}", env!("CARGO_PKG_VERSION"));
    println!("Description: {}", env!("CARGO_PKG_DESCRIPTION"));
    println!("License: {}", env!("CARGO_PKG_LICENSE"));
    println!();

    println!("Build Information:");
    println!("  Commit: {}", crate::build::SHORT_COMMIT);
    println!("  Build Time: {}", crate::build::BUILD_TIME);
    println!("  Rust Version: {}", crate::build::RUST_VERSION);
    println!(
        "  Build Profile: {}",
        if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        }
    );
    println!();

    println!("Runtime Information:");
    println!("  Platform: linux");
    println!("  Architecture: {}", std::env::consts::ARCH);

    Ok(())
}

/// Set up graceful shutdown signal handling for Linux
pub async fn setup_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
