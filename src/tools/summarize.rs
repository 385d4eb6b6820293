//! Kagi Universal Summarizer tool

use crate::credential::CallContext;
use crate::error::{Error, Result};
use crate::kagi::{KagiClient, SummarizeRequest, SummaryEngine, SummaryType};
use crate::tools::{format, input_schema, read_only_tool, with_enum, Tool};
use async_trait::async_trait;
use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tool name as advertised to clients
pub const TOOL_NAME: &str = "kagi_summarize";

/// Summarize tool parameters
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct KagiSummarizeTool {
    /// URL of the webpage to summarize
    pub url: String,

    /// Summarization engine to use (cecil, agnes, muriel)
    #[serde(default = "default_engine", skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    /// Summary types control the structure of the summary output (summary, takeaway)
    #[serde(default = "default_summary_type", skip_serializing_if = "Option::is_none")]
    pub summary_type: Option<String>,
}

#[allow(clippy::unnecessary_wraps)]
fn default_engine() -> Option<String> {
    Some(SummaryEngine::default().as_str().to_string())
}

#[allow(clippy::unnecessary_wraps)]
fn default_summary_type() -> Option<String> {
    Some(SummaryType::default().as_str().to_string())
}

/// Bind raw call arguments into a [`SummarizeRequest`]
///
/// `url` must be a non-empty string. `engine` and `summary_type` fall back to
/// their defaults when absent or not strings.
///
/// # Errors
/// [`Error::InvalidParameter`] when `url` is missing or empty, or when
/// `engine`/`summary_type` name an unknown value.
pub fn bind_arguments(arguments: &serde_json::Value) -> Result<SummarizeRequest> {
    let target_url = arguments
        .get("url")
        .and_then(serde_json::Value::as_str)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| Error::InvalidParameter("invalid url parameter".to_string()))?;

    let mut request = SummarizeRequest::new(target_url);

    if let Some(engine) = arguments.get("engine").and_then(serde_json::Value::as_str) {
        request.engine = engine.parse()?;
    }
    if let Some(kind) = arguments
        .get("summary_type")
        .and_then(serde_json::Value::as_str)
    {
        request.summary_type = kind.parse()?;
    }

    Ok(request)
}

/// Summarize tool implementation
pub struct KagiSummarizeToolImpl {
    client: Arc<KagiClient>,
}

impl KagiSummarizeToolImpl {
    /// Create a new tool instance
    #[must_use]
    pub fn new(client: Arc<KagiClient>) -> Self {
        Self { client }
    }

    /// Bind, summarize and render
    pub async fn run(&self, arguments: &serde_json::Value, ctx: &CallContext) -> Result<String> {
        let request = bind_arguments(arguments)?;
        let outcome = self.client.summarize(ctx, &request).await?;
        Ok(format::render_summary(&request.target_url, &outcome))
    }
}

#[async_trait]
impl Tool for KagiSummarizeToolImpl {
    fn definition(&self) -> rmcp::model::Tool {
        let mut schema = input_schema::<KagiSummarizeTool>();
        with_enum(&mut schema, "engine", &SummaryEngine::ALL.map(SummaryEngine::as_str));
        with_enum(&mut schema, "summary_type", &SummaryType::ALL.map(SummaryType::as_str));

        read_only_tool(
            TOOL_NAME,
            "Kagi Summarizer",
            "Summarize a webpage using Kagi's Universal Summarizer API",
            schema,
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
                tracing::warn!(error = %e, "kagi summarize failed");
                Ok(CallToolResult::error(vec![Content::text(format!(
                    "kagi summarize failed: {e}"
                ))]))
            }
        }
    }
}
