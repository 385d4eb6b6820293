//! Error handling module

use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum Error {
    /// Initialization error
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// No usable Kagi credential for the call
    #[error("kagi API key not found in call context")]
    CredentialMissing,

    /// A tool argument is absent or has the wrong shape
    #[error("{0}")]
    InvalidParameter(String),

    /// The Kagi API did not answer within the request timeout
    #[error("request to Kagi API timed out")]
    UpstreamTimeout,

    /// The Kagi API could not be reached
    #[error("failed to execute request: {0}")]
    UpstreamUnreachable(String),

    /// The Kagi API answered with a non-200 status
    #[error("API request failed with status {status}: {body}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The Kagi API answered with an unexpected body
    #[error("failed to decode response: {0}")]
    ResponseDecode(String),

    /// The call was cancelled before the Kagi API answered
    #[error("request cancelled")]
    Cancelled,

    /// MCP protocol error
    #[error("MCP protocol error: {0}")]
    Mcp(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parse error
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::UpstreamTimeout
        } else {
            Error::UpstreamUnreachable(err.to_string())
        }
    }
}
