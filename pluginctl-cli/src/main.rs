//! pluginctl - inspect, list, and remove plugins
//!
//! Main entry point: parses flags, sets up logging, resolves configuration
//! and dispatches to the subcommands.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pluginctl_core::{validate_repo_url, Settings};

mod plugins_cli;

use plugins_cli::{CommandContext, PluginsCommand};

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Log output formats
#[derive(Debug, Clone, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[clap(
    name = "pluginctl",
    about = "Inspect locally installed plugins and query the plugin catalog",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Log output format
    #[clap(long, default_value = "text", global = true)]
    log_format: LogFormat,

    /// Settings file (defaults to ~/.config/pluginctl/config.yaml)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Plugin installation directory
    #[clap(long, global = true)]
    plugins_dir: Option<PathBuf>,

    /// Plugin catalog URL
    #[clap(long, global = true)]
    repo: Option<String>,

    /// Host version reported to the catalog
    #[clap(long, global = true)]
    grafana_version: Option<String>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Manage plugins
    Plugins(PluginsCommand),
}

/// Initialize tracing with CLI flags
///
/// `RUST_LOG` takes precedence over --log-level when set.
fn initialize_tracing(log_level: &LogLevel, log_format: &LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    // Logs go to stderr so stdout stays machine-readable with --json
    match log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// Merge the settings file with command-line overrides
fn resolve_context(cli: &Cli) -> Result<CommandContext> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::load()?,
    };

    let mut client_config = settings.client_config();
    if let Some(repo) = &cli.repo {
        validate_repo_url(repo).context("Invalid --repo")?;
        client_config.repo_url = repo.clone();
    }
    if let Some(version) = &cli.grafana_version {
        client_config.version = version.clone();
    }

    let plugins_dir = cli
        .plugins_dir
        .clone()
        .unwrap_or_else(|| settings.plugins_dir());

    tracing::debug!(
        plugins_dir = %plugins_dir.display(),
        repo = %client_config.repo_url,
        version = %client_config.version,
        "Resolved configuration"
    );

    Ok(CommandContext {
        plugins_dir,
        client_config,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, &cli.log_format);

    let context = resolve_context(&cli)?;

    match cli.command {
        Command::Plugins(command) => command.execute(&context).await,
    }
}
