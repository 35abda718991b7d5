//! SiteProbe - heuristic snapshot of a web page's technologies and security
//! posture.
//!
//! Main entry point for the SiteProbe CLI.

mod cli;
mod cmd_analyze;
mod cmd_history;
mod terminal;

use std::path::Path;
use std::sync::OnceLock;

use clap::Parser;
use tracing::{debug, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use siteprobe_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};

use crate::cli::{Cli, Commands};

/// Keeps the file writer flushing for the program duration.
static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize tracing with console output and, when configured, a daily
/// rolling log file.
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let file_layer = match &logging.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("siteprobe")
                .filename_suffix("log")
                .max_log_files(30)
                .build(dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let _ = GUARD.set(guard);
            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        // Results own stdout.
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(file_layer)
        .init();

    Ok(())
}

/// Reject invalid configuration and log its warnings.
fn validate(config: &Config) -> anyhow::Result<()> {
    let validation = ConfigValidator::ensure_valid(config)?;
    for warning in validation.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    Ok(())
}

fn check_config(path: &Path) -> anyhow::Result<()> {
    let config = ConfigLoader::load(path)?;
    let result = ConfigValidator::validate(&config)?;

    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }
    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    if !result.is_valid() {
        anyhow::bail!("{} has {} error(s)", path.display(), result.errors.len());
    }
    println!("{} is valid", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::CheckConfig = cli.command {
        return check_config(&cli.config);
    }

    let config = ConfigLoader::load_or_default(&cli.config)?;
    init_tracing(&config.logging)?;
    validate(&config)?;
    debug!("Configuration loaded from {}", cli.config.display());

    match cli.command {
        Commands::Analyze {
            url,
            json,
            export,
            auto_inject,
        } => cmd_analyze::handle_analyze(config, &url, json, export.as_deref(), auto_inject).await,
        Commands::History { format } => cmd_history::handle_history(&config, &format).await,
        Commands::Forget { domain } => cmd_history::handle_forget(&config, &domain).await,
        Commands::CheckConfig => Ok(()),
    }
}
