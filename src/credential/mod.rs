//! Kagi credential resolution
//!
//! Every tool call carries an explicit [`CallContext`] built by the transport
//! adapter. The stdio transport always uses the process-wide key; the HTTP
//! transport lets a caller override it per request with the
//! [`API_KEY_HEADER`] header.

use crate::error::{Error, Result};
use axum::http::HeaderMap;
use std::fmt;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Request header carrying a per-request Kagi API key
pub const API_KEY_HEADER: &str = "X-Kagi-API-Key";

/// Environment variable holding the process-wide Kagi API key
pub const API_KEY_ENV: &str = "KAGI_API_KEY";

/// Opaque Kagi API token
///
/// `Debug` is redacted so the token never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token, rejecting the empty string
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Raw token, for building the `Authorization` header
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Per-call execution context
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    credential: Option<Credential>,
    cancellation: CancellationToken,
}

impl CallContext {
    /// Create a context with a fresh cancellation token
    #[must_use]
    pub fn new(credential: Option<Credential>) -> Self {
        Self {
            credential,
            cancellation: CancellationToken::new(),
        }
    }

    /// Replace the cancellation token with the transport's per-request one
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Credential attached to this call
    ///
    /// # Errors
    /// Returns [`Error::CredentialMissing`] when the transport attached none.
    pub fn credential(&self) -> Result<&Credential> {
        self.credential.as_ref().ok_or(Error::CredentialMissing)
    }

    /// Resolves once the call has been cancelled
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancellation.cancelled()
    }
}

/// Chooses the credential for each incoming call
#[derive(Debug, Clone, Default)]
pub struct CredentialResolver {
    default: Option<Credential>,
}

impl CredentialResolver {
    /// Create a resolver around the process-wide key
    #[must_use]
    pub fn new(default: Option<Credential>) -> Self {
        Self { default }
    }

    /// Context for a stdio call: always the process-wide key
    #[must_use]
    pub fn for_stdio(&self) -> CallContext {
        CallContext::new(self.default.clone())
    }

    /// Context for an HTTP call: the header override when present and
    /// non-empty, otherwise the process-wide key
    #[must_use]
    pub fn from_headers(&self, headers: &HeaderMap) -> CallContext {
        let header_key = headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(Credential::new);

        CallContext::new(header_key.or_else(|| self.default.clone()))
    }
}
