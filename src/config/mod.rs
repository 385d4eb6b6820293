//! Configuration module
//!
//! Layering, lowest to highest: defaults, TOML file, environment, CLI flags.

use crate::credential::API_KEY_ENV;
use crate::error::Error;
use crate::server::transport::TransportMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Kagi API configuration
    pub kagi: KagiConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server name
    pub name: String,

    /// Host address
    ///
    /// Loopback by default; set `0.0.0.0` to listen on all interfaces.
    pub host: String,

    /// Port
    pub port: u16,

    /// Transport mode
    pub transport_mode: String,

    /// Accepted `Host` header values; empty accepts any
    pub allowed_hosts: Vec<String>,

    /// Accepted `Origin` header values; `*` accepts any
    pub allowed_origins: Vec<String>,
}

/// Kagi API configuration
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KagiConfig {
    /// Process-wide API key
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// API base URL
    pub base_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,

    /// Log file path
    pub file_path: Option<String>,

    /// Whether to log to the console (stderr)
    pub enable_console: bool,

    /// Whether to log to a daily rolling file
    pub enable_file: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: crate::NAME.to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            transport_mode: "stdio".to_string(),
            allowed_hosts: vec!["localhost".to_string(), "127.0.0.1".to_string()],
            allowed_origins: vec!["*".to_string()],
        }
    }
}

impl Default for KagiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: crate::kagi::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for KagiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KagiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: Some("./logs/kagi-mcp.log".to_string()),
            enable_console: true,
            enable_file: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    ///
    /// Missing sections and keys take their defaults. The result is not
    /// validated; call [`AppConfig::validate`] once all layers are applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
    }

    /// Load configuration from the file if it exists, then apply environment
    /// overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded, or if an
    /// environment variable has an invalid value
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };

        config.apply_env()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable has an invalid value
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `KAGI_MCP_PORT` is not a valid port number
    pub fn apply_env(&mut self) -> Result<(), Error> {
        if let Some(key) = non_empty_env(API_KEY_ENV) {
            self.kagi.api_key = Some(key);
        }

        if let Some(base_url) = non_empty_env("KAGI_MCP_BASE_URL") {
            self.kagi.base_url = base_url;
        }

        if let Some(host) = non_empty_env("KAGI_MCP_HOST") {
            self.server.host = host;
        }

        if let Some(port) = non_empty_env("KAGI_MCP_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid port: {e}")))?;
        }

        if let Some(mode) = non_empty_env("KAGI_MCP_TRANSPORT_MODE") {
            self.server.transport_mode = mode;
        }

        if let Some(level) = non_empty_env("KAGI_MCP_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Parsed transport mode
    ///
    /// # Errors
    ///
    /// Returns an error if the configured mode is unknown
    pub fn transport_mode(&self) -> Result<TransportMode, Error> {
        self.server.transport_mode.parse().map_err(Error::Config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid (missing API key,
    /// empty host, port 0, unknown transport mode or log level, bad base URL)
    pub fn validate(&self) -> Result<(), Error> {
        if self.kagi.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(Error::Config(format!(
                "Kagi API key not provided. Use --api-key flag or {API_KEY_ENV} environment variable"
            )));
        }

        if self.server.host.is_empty() {
            return Err(Error::Config("Server host cannot be empty".to_string()));
        }

        if self.server.port == 0 {
            return Err(Error::Config("Server port cannot be 0".to_string()));
        }

        self.transport_mode()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(Error::Config(format!(
                "Invalid log level: {}, valid values: {:?}",
                self.logging.level, valid_levels
            )));
        }

        url::Url::parse(&self.kagi.base_url)
            .map_err(|e| Error::Config(format!("Invalid Kagi base URL: {e}")))?;

        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
