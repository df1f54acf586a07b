//! MCP server over stdio.
//!
//! The assistant launches `obsidian-mcp serve` as a child process and
//! speaks JSON-RPC on its stdin/stdout. Stdout therefore carries protocol
//! frames only; all logging goes to stderr (see [`crate::logging`]).
//!
//! # Claude Code Integration
//!
//! `obsidian-mcp install --vault ~/Notes` writes the equivalent of:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "obsidian-claude-code": {
//!       "command": "/path/to/obsidian-mcp",
//!       "args": ["serve"],
//!       "env": { "OBSIDIAN_VAULT_PATH": "/home/me/Notes" }
//!     }
//!   }
//! }
//! ```

use anyhow::Context;
use rmcp::{transport::stdio, ServiceExt};

use crate::mcp::McpBridge;
use crate::tools::{ToolContext, ToolRegistry};

/// Serve the built-in vault tools until the client disconnects.
pub async fn run_server(ctx: ToolContext) -> anyhow::Result<()> {
    run_server_with_tools(ctx, ToolRegistry::with_builtins()).await
}

/// Serve an arbitrary tool registry, e.g. built-ins plus custom Rust tools.
///
/// ```rust,no_run
/// use obsidian_mcp::server::run_server_with_tools;
/// use obsidian_mcp::tools::{ToolContext, ToolRegistry};
///
/// # async fn example() -> anyhow::Result<()> {
/// let mut tools = ToolRegistry::with_builtins();
/// // tools.register(Box::new(MyTool));
/// let ctx = ToolContext::new("/home/me/Notes", std::env::current_dir()?);
/// run_server_with_tools(ctx, tools).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_server_with_tools(ctx: ToolContext, tools: ToolRegistry) -> anyhow::Result<()> {
    // Fail fast on an unusable vault path instead of on the first tool call.
    let vault = ctx.vault().context("Failed to open vault")?;
    tracing::info!(
        vault = %vault.root().display(),
        cwd = %ctx.cwd().display(),
        tools = tools.len(),
        "starting MCP server on stdio"
    );

    let service = McpBridge::new(ctx, tools)
        .serve(stdio())
        .await
        .context("Failed to start MCP stdio transport")?;
    let reason = service.waiting().await?;
    tracing::info!(?reason, "MCP server stopped");
    Ok(())
}
