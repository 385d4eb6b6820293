//! MCP tools module
//!
//! Provides the `kagi_search` and `kagi_summarize` tools.

pub mod format;
pub mod search;
pub mod summarize;

use crate::credential::CallContext;
use crate::kagi::KagiClient;
use async_trait::async_trait;
use rmcp::model::{CallToolResult, JsonObject, Tool as McpTool, ToolAnnotations};
use rmcp::ErrorData;
use schemars::JsonSchema;
use std::sync::Arc;

/// Tool trait
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get tool definition
    fn definition(&self) -> McpTool;

    /// Execute tool with the caller's context
    ///
    /// Binding failures are protocol errors; upstream failures come back as
    /// a result flagged `isError`.
    async fn execute(
        &self,
        arguments: serde_json::Value,
        ctx: &CallContext,
    ) -> std::result::Result<CallToolResult, ErrorData>;
}

/// Tool registry
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new tool registry
    #[must_use]
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register tool
    #[must_use]
    pub fn register<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    /// Get all tool definitions
    #[must_use]
    pub fn get_tools(&self) -> Vec<McpTool> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Whether a tool with this name is registered
    #[must_use]
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.definition().name == name)
    }

    /// Execute tool
    pub async fn execute_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
        ctx: &CallContext,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        for tool in &self.tools {
            if tool.definition().name == name {
                return tool.execute(arguments, ctx).await;
            }
        }

        Err(ErrorData::invalid_params(format!("Unknown tool: {name}"), None))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create default tool registry
#[must_use]
pub fn create_default_registry(client: &Arc<KagiClient>) -> ToolRegistry {
    ToolRegistry::new()
        .register(search::KagiSearchToolImpl::new(client.clone()))
        .register(summarize::KagiSummarizeToolImpl::new(client.clone()))
}

/// JSON schema of a parameter struct, as a tool input schema
#[must_use]
pub fn input_schema<T: JsonSchema>() -> JsonObject {
    let mut schema = match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(serde_json::Value::Object(schema)) => schema,
        _ => JsonObject::new(),
    };
    schema.remove("$schema");
    schema.remove("title");
    schema
}

/// Add an `enum` constraint to a property of an input schema
///
/// Returns `false` when the property does not exist.
pub fn with_enum(schema: &mut JsonObject, property: &str, values: &[&str]) -> bool {
    let Some(property) = schema
        .get_mut("properties")
        .and_then(|properties| properties.get_mut(property))
        .and_then(serde_json::Value::as_object_mut)
    else {
        return false;
    };

    property.insert("enum".to_string(), serde_json::json!(values));
    true
}

/// Read-only, idempotent tool talking to the open web
fn read_only_tool(
    name: &'static str,
    title: &str,
    description: &'static str,
    schema: JsonObject,
) -> McpTool {
    let mut tool = McpTool::new(name, description, Arc::new(schema));
    tool.title = Some(title.to_string());
    tool.annotations = Some(ToolAnnotations {
        read_only_hint: Some(true),
        destructive_hint: Some(false),
        idempotent_hint: Some(true),
        open_world_hint: Some(true),
        ..Default::default()
    });
    tool
}
