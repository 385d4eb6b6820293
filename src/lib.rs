//! Kagi MCP Server
//!
//! Exposes Kagi Search and the Kagi Universal Summarizer as MCP tools over
//! stdio or HTTP.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod credential;
pub mod error;
pub mod kagi;
pub mod server;
pub mod tools;

/// Re-export common types
pub use crate::error::{Error, Result};
pub use crate::server::{KagiMcpServer, ServerConfig};

/// Server version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name
pub const NAME: &str = "kagi-mcp";

/// Initialize logging system with configuration
///
/// Console output goes to stderr: stdout belongs to the stdio transport.
///
/// # Errors
/// Returns an error if logging system initialization fails
pub fn init_logging_with_config(config: &crate::config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Parse log level
    let level = match config.level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };

    let filter = EnvFilter::new(level);

    let file_layer = match (config.enable_file, &config.file_path) {
        (true, Some(file_path)) => {
            let path = std::path::Path::new(file_path);
            let log_dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let log_file_name = path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("kagi-mcp.log"));

            std::fs::create_dir_all(log_dir).map_err(|e| {
                Error::Initialization(format!("Failed to create log directory: {e}"))
            })?;

            let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .compact(),
            )
        }
        _ => None,
    };

    // Fall back to the console when no file sink is active.
    let console_layer = (config.enable_console || file_layer.is_none()).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Initialization(e.to_string()))?;

    Ok(())
}
