//! Kagi web search tool

use crate::credential::CallContext;
use crate::error::{Error, Result};
use crate::kagi::{KagiClient, SearchQuery, DEFAULT_SEARCH_LIMIT};
use crate::tools::{format, input_schema, read_only_tool, Tool};
use async_trait::async_trait;
use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tool name as advertised to clients
pub const TOOL_NAME: &str = "kagi_search";

/// Search tool parameters
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct KagiSearchTool {
    /// The search query string
    pub query: String,

    /// Maximum number of results (1-10)
    #[serde(default = "default_limit", skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1, max = 10))]
    pub limit: Option<u32>,
}

#[allow(clippy::unnecessary_wraps)]
fn default_limit() -> Option<u32> {
    Some(DEFAULT_SEARCH_LIMIT)
}

/// Bind raw call arguments into a [`SearchQuery`]
///
/// `query` must be a non-empty string. `limit` is used when it is a number
/// (truncated, negatives become 0); anything else falls back to the default.
///
/// # Errors
/// [`Error::InvalidParameter`] when `query` is missing, not a string or empty.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn bind_arguments(arguments: &serde_json::Value) -> Result<SearchQuery> {
    let text = arguments
        .get("query")
        .and_then(serde_json::Value::as_str)
        .filter(|query| !query.is_empty())
        .ok_or_else(|| Error::InvalidParameter("invalid query parameter".to_string()))?;

    let limit = arguments
        .get("limit")
        .and_then(serde_json::Value::as_f64)
        .map_or(DEFAULT_SEARCH_LIMIT, |limit| limit as u32);

    Ok(SearchQuery::new(text).with_limit(limit))
}

/// Search tool implementation
pub struct KagiSearchToolImpl {
    client: Arc<KagiClient>,
}

impl KagiSearchToolImpl {
    /// Create a new tool instance
    #[must_use]
    pub fn new(client: Arc<KagiClient>) -> Self {
        Self { client }
    }

    /// Bind, search and render
    pub async fn run(&self, arguments: &serde_json::Value, ctx: &CallContext) -> Result<String> {
        let query = bind_arguments(arguments)?;
        let outcome = self.client.search(ctx, &query).await?;
        tracing::debug!(
            results = outcome.items.len(),
            related = outcome.related_terms.len(),
            "kagi search completed"
        );
        Ok(format::render_search(&query.text, &outcome))
    }
}

#[async_trait]
impl Tool for KagiSearchToolImpl {
    fn definition(&self) -> rmcp::model::Tool {
        read_only_tool(
            TOOL_NAME,
            "Kagi Search",
            "Search the web using Kagi",
            input_schema::<KagiSearchTool>(),
        )
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        ctx: &CallContext,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        match self.run(&arguments, ctx).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(Error::InvalidParameter(message)) => Err(ErrorData::invalid_params(message, None)),
            Err(e) => {
                tracing::warn!(error = %e, "kagi search failed");
                Ok(CallToolResult::error(vec![Content::text(format!(
                    "kagi search failed: {e}"
                ))]))
            }
        }
    }
}
