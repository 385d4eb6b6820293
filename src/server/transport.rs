//! Transport module
//!
//! Both transports run on the rmcp runtime: stdio over the process pipes,
//! HTTP as streamable HTTP on the router in [`crate::server::http`].

use crate::error::{Error, Result};
use crate::server::handler::KagiHandler;
use crate::server::KagiMcpServer;
use rmcp::ServiceExt;
use std::sync::Arc;

/// Run Stdio server until the client closes the pipe
pub async fn run_stdio_server(server: &KagiMcpServer) -> Result<()> {
    tracing::info!("Starting stdio MCP server");

    let handler = KagiHandler::new(Arc::new(server.clone()));
    let running = handler
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| Error::Mcp(e.to_string()))?;

    let reason = running
        .waiting()
        .await
        .map_err(|e| Error::Mcp(e.to_string()))?;
    tracing::info!("stdio MCP server stopped: {reason:?}");
    Ok(())
}

/// Run HTTP server until Ctrl-C
pub async fn run_http_server(server: &KagiMcpServer) -> Result<()> {
    let config = server.config();
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(
        "HTTP MCP server listening on {}{}",
        listener.local_addr()?,
        super::http::MCP_PATH
    );

    axum::serve(listener, super::http::router(Arc::new(server.clone())))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP MCP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

/// Transport mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum TransportMode {
    /// Stdio transport (process pipe)
    Stdio,
    /// Streamable HTTP transport
    Http,
}

impl std::str::FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdio" => Ok(TransportMode::Stdio),
            "http" => Ok(TransportMode::Http),
            _ => Err(format!("Unknown transport mode: {s} (expected stdio or http)")),
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportMode::Stdio => write!(f, "stdio"),
            TransportMode::Http => write!(f, "http"),
        }
    }
}

/// Run server using the given transport mode
pub async fn run_server_with_mode(server: &KagiMcpServer, mode: TransportMode) -> Result<()> {
    match mode {
        TransportMode::Stdio => run_stdio_server(server).await,
        TransportMode::Http => run_http_server(server).await,
    }
}
