//! Kagi API client
//!
//! Thin wrapper over the two Kagi endpoints this server exposes. Every call
//! takes its credential from the [`CallContext`], is bounded by
//! [`UPSTREAM_TIMEOUT`] and is never retried.

pub mod types;

pub use types::{
    SearchOutcome, SearchQuery, SearchResultItem, SummarizeRequest, SummaryEngine,
    SummaryOutcome, SummaryType, DEFAULT_SEARCH_LIMIT,
};

use crate::credential::CallContext;
use crate::error::{Error, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Public Kagi API host
pub const DEFAULT_BASE_URL: &str = "https://kagi.com";

/// Per-request timeout for every Kagi call
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(29);

const SEARCH_PATH: &str = "api/v0/search";
const SUMMARIZE_PATH: &str = "api/v0/summarize";

/// Kagi client builder
pub struct KagiClientBuilder {
    base_url: String,
    connect_timeout: Duration,
    user_agent: String,
}

impl Default for KagiClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

impl KagiClientBuilder {
    /// Create a new builder pointing at the public API
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL (scheme and host, optionally a path prefix)
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set connection timeout
    #[must_use]
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Set User-Agent
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<KagiClient> {
        // Url::join drops the last path segment unless it ends with '/'.
        let mut base = self.base_url;
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let http = Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .connect_timeout(self.connect_timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| Error::Initialization(format!("failed to create HTTP client: {e}")))?;

        Ok(KagiClient { http, base_url })
    }
}

/// Kagi API client
///
/// Cheap to share behind an `Arc`; holds no per-call state.
#[derive(Debug, Clone)]
pub struct KagiClient {
    http: Client,
    base_url: Url,
}

impl KagiClient {
    /// Client for the public API with default settings
    pub fn new() -> Result<Self> {
        KagiClientBuilder::new().build()
    }

    /// Client builder
    #[must_use]
    pub fn builder() -> KagiClientBuilder {
        KagiClientBuilder::new()
    }

    /// Base URL requests are resolved against
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Run a web search
    ///
    /// # Errors
    /// [`Error::CredentialMissing`] before any request when the context has no
    /// key; otherwise the upstream failure kinds of [`Error`].
    pub async fn search(&self, ctx: &CallContext, query: &SearchQuery) -> Result<SearchOutcome> {
        ctx.credential()?;

        let mut params = vec![("q", query.text.clone())];
        if query.limit > 0 {
            params.push(("limit", query.limit.to_string()));
        }
        let url = self.endpoint(SEARCH_PATH, &params)?;

        tracing::debug!(limit = query.limit, "kagi search");
        let envelope: types::SearchEnvelope = self.get_json(ctx, url).await?;
        Ok(envelope.into())
    }

    /// Summarize a web page
    ///
    /// `engine` and `summary_type` are always sent, defaults included.
    ///
    /// # Errors
    /// Same as [`KagiClient::search`].
    pub async fn summarize(
        &self,
        ctx: &CallContext,
        request: &SummarizeRequest,
    ) -> Result<SummaryOutcome> {
        ctx.credential()?;

        let url = self.endpoint(
            SUMMARIZE_PATH,
            &[
                ("url", request.target_url.clone()),
                ("engine", request.engine.as_str().to_string()),
                ("summary_type", request.summary_type.as_str().to_string()),
            ],
        )?;

        tracing::debug!(
            engine = %request.engine,
            summary_type = %request.summary_type,
            "kagi summarize"
        );
        let envelope: types::SummaryEnvelope = self.get_json(ctx, url).await?;
        Ok(envelope.into())
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())));
        Ok(url)
    }

    /// Authenticated GET, decoded as JSON on 200
    async fn get_json<T: DeserializeOwned>(&self, ctx: &CallContext, url: Url) -> Result<T> {
        let credential = ctx.credential()?;

        let request = self
            .http
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bot {}", credential.expose()));

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();

            if status != StatusCode::OK {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(status = status.as_u16(), "kagi API returned an error status");
                return Err(Error::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }

            let bytes = response.bytes().await?;
            serde_json::from_slice(&bytes).map_err(|e| Error::ResponseDecode(e.to_string()))
        };

        tokio::select! {
            biased;
            () = ctx.cancelled() => {
                tracing::debug!("kagi request cancelled");
                Err(Error::Cancelled)
            }
            result = exchange => result,
        }
    }
}
