//! Server module
//!
//! Wires the Kagi client, the tool registry and the credential resolver
//! together, and runs them over the selected transport.

pub mod handler;
pub mod http;
pub mod transport;

use crate::config::AppConfig;
use crate::credential::{Credential, CredentialResolver};
use crate::error::Result;
use crate::kagi::KagiClient;
use crate::tools::ToolRegistry;
use rmcp::model::{Implementation, ServerCapabilities, ServerInfo};
use std::sync::Arc;

/// Server identity and listen address
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct ServerConfig {
    /// Server name
    pub name: String,

    /// Server version
    pub version: String,

    /// Host address (HTTP transport)
    pub host: String,

    /// Port (HTTP transport)
    pub port: u16,

    /// Accepted `Host` header values (HTTP transport); empty accepts any
    pub allowed_hosts: Vec<String>,

    /// Accepted `Origin` header values (HTTP transport); `*` accepts any
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: crate::NAME.to_string(),
            version: crate::VERSION.to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            allowed_hosts: vec!["localhost".to_string(), "127.0.0.1".to_string()],
            allowed_origins: vec!["*".to_string()],
        }
    }
}

/// MCP server
#[derive(Clone)]
pub struct KagiMcpServer {
    config: ServerConfig,
    tool_registry: Arc<ToolRegistry>,
    credentials: CredentialResolver,
}

impl KagiMcpServer {
    /// Create a server from application configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Arc::new(
            KagiClient::builder()
                .base_url(config.kagi.base_url.clone())
                .user_agent(format!("{}/{}", config.server.name, crate::VERSION))
                .build()?,
        );
        tracing::info!(base_url = %client.base_url(), "Kagi client ready");
        let default_key = config.kagi.api_key.clone().and_then(Credential::new);

        Ok(Self::with_parts(
            ServerConfig {
                name: config.server.name.clone(),
                version: crate::VERSION.to_string(),
                host: config.server.host.clone(),
                port: config.server.port,
                allowed_hosts: config.server.allowed_hosts.clone(),
                allowed_origins: config.server.allowed_origins.clone(),
            },
            &client,
            CredentialResolver::new(default_key),
        ))
    }

    /// Assemble a server from an existing client and resolver
    #[must_use]
    pub fn with_parts(
        config: ServerConfig,
        client: &Arc<KagiClient>,
        credentials: CredentialResolver,
    ) -> Self {
        Self {
            config,
            tool_registry: Arc::new(crate::tools::create_default_registry(client)),
            credentials,
        }
    }

    /// Get server configuration
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get tool registry
    #[must_use]
    pub fn tool_registry(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Get credential resolver
    #[must_use]
    pub fn credentials(&self) -> &CredentialResolver {
        &self.credentials
    }

    /// Get server information
    #[must_use]
    pub fn server_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.name.clone(),
                version: self.config.version.clone(),
                title: Some("Kagi MCP Server".to_string()),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "This server provides access to Kagi Search and Summarizer APIs.".to_string(),
            ),
            ..Default::default()
        }
    }
}
