//! MCP JSON-RPC protocol bridge.
//!
//! Adapts the [`ToolRegistry`] to rmcp's [`ServerHandler`], so the vault
//! tools appear to the assistant through `list_tools` / `call_tool`.
//!
//! Tool failures are returned as `CallToolResult::error` payloads rather
//! than protocol errors, which keeps the session alive. Only an unknown
//! tool name is a protocol-level error.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler};

use crate::tools::{ToolContext, ToolRegistry};

/// Name the server reports during MCP initialization.
pub const SERVER_NAME: &str = "obsidian-claude-code";

/// Bridges the tool registry to the MCP JSON-RPC protocol.
#[derive(Clone)]
pub struct McpBridge {
    ctx: Arc<ToolContext>,
    tools: Arc<ToolRegistry>,
}

impl McpBridge {
    pub fn new(ctx: ToolContext, tools: ToolRegistry) -> Self {
        Self {
            ctx: Arc::new(ctx),
            tools: Arc::new(tools),
        }
    }

    /// Convert a registry tool into an rmcp `Tool` descriptor.
    fn to_mcp_tool(tool: &dyn crate::tools::Tool) -> Tool {
        let input_schema: Arc<serde_json::Map<String, serde_json::Value>> =
            match tool.parameters_schema() {
                serde_json::Value::Object(map) => Arc::new(map),
                _ => Arc::new(serde_json::Map::new()),
            };

        Tool {
            name: Cow::Owned(tool.name().to_string()),
            title: None,
            description: Some(Cow::Owned(tool.description().to_string())),
            input_schema,
            output_schema: None,
            annotations: Some(ToolAnnotations::new().read_only(tool.read_only())),
            execution: None,
            icons: None,
            meta: None,
        }
    }

    /// Run a tool by name and wrap its text in a `CallToolResult`.
    ///
    /// Returns `None` when no tool has that name.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Option<CallToolResult> {
        let tool = self.tools.find(name)?;
        let params = serde_json::Value::Object(arguments.unwrap_or_default());

        tracing::info!(tool = name, "tool call");
        let result = match tool.execute(params, &self.ctx).await {
            Ok(text) => CallToolResult::success(vec![Content::text(text)]),
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool call failed");
                CallToolResult::error(vec![Content::text(format!("{}: {}", name, e))])
            }
        };
        Some(result)
    }
}

impl ServerHandler for McpBridge {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                title: Some("Obsidian for Claude Code".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Saves reports, reviews, and notes into the user's Obsidian vault. \
                 Use save_to_obsidian to store content with the project's templates, \
                 read_obsidian_url to open an obsidian:// link, and list_vault_files or \
                 get_vault_structure to browse the vault."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools: Vec<Tool> = self
            .tools
            .tools()
            .iter()
            .map(|t| Self::to_mcp_tool(t.as_ref()))
            .collect();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tools.find(name).map(Self::to_mcp_tool)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = request.name.to_string();
        self.dispatch(&name, request.arguments)
            .await
            .ok_or_else(|| {
                McpError::new(
                    ErrorCode::METHOD_NOT_FOUND,
                    format!("no tool registered with name: {}", name),
                    None,
                )
            })
    }
}
