//! Kagi MCP server binary

use anyhow::Context;
use clap::Parser;
use kagi_mcp::config::{AppConfig, LoggingConfig};
use kagi_mcp::server::transport;
use kagi_mcp::KagiMcpServer;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "kagi-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP server for Kagi Search and the Kagi Universal Summarizer", long_about = None)]
struct Cli {
    /// Transport mode [stdio, http]
    #[arg(short = 't', long = "transport", alias = "mode")]
    transport: Option<String>,

    /// Kagi API key
    #[arg(long = "api-key", env = "KAGI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Listen host (http transport)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (http transport)
    #[arg(short, long)]
    port: Option<u16>,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            // Make sure the failure is still reported.
            let _ = kagi_mcp::init_logging_with_config(&LoggingConfig::default());
            return Err(e);
        }
    };

    let mut logging = config.logging.clone();
    if cli.debug {
        logging.level = "debug".to_string();
    }
    kagi_mcp::init_logging_with_config(&logging).context("failed to initialize logging")?;

    config.validate().context("invalid configuration")?;
    let mode = config.transport_mode()?;

    tracing::info!("Starting Kagi MCP server v{}", kagi_mcp::VERSION);

    let server = KagiMcpServer::new(&config).context("failed to create server")?;

    tracing::info!("Using {mode} transport");
    transport::run_server_with_mode(&server, mode)
        .await
        .with_context(|| format!("{mode} server failed"))?;

    Ok(())
}

/// Load file and environment configuration, then apply command-line flags
fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    if let Some(key) = cli.api_key.clone().filter(|key| !key.is_empty()) {
        config.kagi.api_key = Some(key);
    }
    if let Some(mode) = &cli.transport {
        config.server.transport_mode.clone_from(mode);
    }
    if let Some(host) = &cli.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    Ok(config)
}
