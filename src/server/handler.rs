//! MCP handler shared by both transports

use crate::credential::CallContext;
use crate::server::KagiMcpServer;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Extensions, InitializeRequestParam, InitializeResult,
    ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Protocol revisions this server speaks besides the latest one
const SUPPORTED_PROTOCOL_VERSIONS: [ProtocolVersion; 2] =
    [ProtocolVersion::V_2024_11_05, ProtocolVersion::V_2025_03_26];

/// MCP server handler
///
/// Stdio calls run with the process-wide Kagi key. Streamable HTTP calls
/// carry the request head in their extensions, so the `X-Kagi-API-Key`
/// header can override the key for that call.
#[derive(Clone)]
pub struct KagiHandler {
    server: Arc<KagiMcpServer>,
}

impl KagiHandler {
    /// Create a new handler
    #[must_use]
    pub fn new(server: Arc<KagiMcpServer>) -> Self {
        Self { server }
    }

    /// Build the context of one tool call
    ///
    /// `ct` is cancelled when the client sends `notifications/cancelled` for
    /// the request or the session goes away.
    #[must_use]
    pub fn call_context(&self, extensions: &Extensions, ct: CancellationToken) -> CallContext {
        let credentials = self.server.credentials();
        let ctx = match extensions.get::<axum::http::request::Parts>() {
            Some(parts) => credentials.from_headers(&parts.headers),
            None => credentials.for_stdio(),
        };
        ctx.with_cancellation(ct)
    }
}

impl ServerHandler for KagiHandler {
    fn get_info(&self) -> ServerInfo {
        self.server.server_info()
    }

    async fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, ErrorData> {
        let mut info = self.get_info();
        if SUPPORTED_PROTOCOL_VERSIONS.contains(&request.protocol_version) {
            info.protocol_version = request.protocol_version;
        }
        tracing::debug!(
            client = %request.client_info.name,
            protocol_version = ?info.protocol_version,
            "client initialized"
        );
        Ok(info)
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(
            self.server.tool_registry().get_tools(),
        ))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        tracing::debug!(tool = %request.name, "tool call");
        let ctx = self.call_context(&context.extensions, context.ct.clone());
        let arguments = request
            .arguments
            .map_or(serde_json::Value::Null, serde_json::Value::Object);

        self.server
            .tool_registry()
            .execute_tool(&request.name, arguments, &ctx)
            .await
    }
}
