//! MCP tools exposed to the assistant.
//!
//! Every tool implements [`Tool`] and is collected in a [`ToolRegistry`].
//! The MCP bridge ([`crate::mcp`]) lists and dispatches through the
//! registry, so adding a tool means implementing the trait and registering
//! it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 ToolRegistry                 │
//! │  save_to_obsidian     save_claude_response   │
//! │  read_obsidian_url    list_vault_files       │
//! │  get_vault_structure  (+ custom Rust tools)  │
//! └──────────────────────┬───────────────────────┘
//!                        ▼
//!             McpBridge → stdio transport
//! ```
//!
//! # Usage
//!
//! ```rust
//! use obsidian_mcp::tools::ToolRegistry;
//!
//! let mut tools = ToolRegistry::with_builtins();
//! // tools.register(Box::new(MyTool));
//! assert_eq!(tools.len(), 5);
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{Result, VaultError};
use crate::notes::{save_note, save_raw, NoteRequest, RawNoteRequest};
use crate::template::ContentType;
use crate::vault::Vault;
use crate::Timestamp;

// ═══════════════════════════════════════════════════════════════════════
// Tool Trait
// ═══════════════════════════════════════════════════════════════════════

/// An MCP tool the assistant can discover and call.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use serde_json::{json, Value};
/// use obsidian_mcp::error::Result;
/// use obsidian_mcp::tools::{Tool, ToolContext};
///
/// pub struct VaultRootTool;
///
/// #[async_trait]
/// impl Tool for VaultRootTool {
///     fn name(&self) -> &str { "vault_root" }
///     fn description(&self) -> &str { "Show the vault root directory" }
///
///     fn parameters_schema(&self) -> Value {
///         json!({ "type": "object", "properties": {} })
///     }
///
///     async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<String> {
///         Ok(ctx.vault()?.root().display().to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Lowercase identifier with underscores, e.g. `"save_to_obsidian"`.
    fn name(&self) -> &str;

    /// One-line description the assistant uses to decide when to call the tool.
    fn description(&self) -> &str;

    /// Whether the tool leaves the vault untouched. Defaults to `true`.
    fn read_only(&self) -> bool {
        true
    }

    /// JSON Schema (`type: "object"`) describing the arguments.
    fn parameters_schema(&self) -> Value;

    /// Run the tool. `params` is always a JSON object.
    ///
    /// The returned text is sent back to the assistant verbatim.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<String>;
}

// ═══════════════════════════════════════════════════════════════════════
// ToolContext
// ═══════════════════════════════════════════════════════════════════════

/// Per-invocation inputs for tools: where the vault is and which
/// directory the assistant is working in.
#[derive(Debug, Clone)]
pub struct ToolContext {
    vault_root: PathBuf,
    cwd: PathBuf,
    fixed_time: Option<Timestamp>,
}

impl ToolContext {
    pub fn new(vault_root: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
            cwd: cwd.into(),
            fixed_time: None,
        }
    }

    /// Pin the clock, so saved filenames and timestamps are predictable.
    pub fn with_fixed_time(mut self, now: Timestamp) -> Self {
        self.fixed_time = Some(now);
        self
    }

    pub fn vault_root(&self) -> &Path {
        &self.vault_root
    }

    /// Directory used for project config discovery.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Open (and if needed create) the vault.
    pub fn vault(&self) -> Result<Vault> {
        Vault::open(&self.vault_root)
    }

    pub fn now(&self) -> Timestamp {
        self.fixed_time.unwrap_or_else(crate::now)
    }
}

fn parse_args<T: DeserializeOwned>(params: Value) -> Result<T> {
    serde_json::from_value(params)
        .map_err(|e| VaultError::validation(format!("invalid arguments: {}", e)))
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Tool Implementations
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct SaveToObsidianArgs {
    #[serde(default)]
    content: String,
    #[serde(default)]
    title: String,
    #[serde(default, rename = "type")]
    content_type: ContentType,
    #[serde(default)]
    tags: Vec<String>,
}

/// Templated save into the project's folder. Delegates to [`save_note`].
pub struct SaveToObsidianTool;

#[async_trait]
impl Tool for SaveToObsidianTool {
    fn name(&self) -> &str {
        "save_to_obsidian"
    }

    fn description(&self) -> &str {
        "Save content to Obsidian using project configuration. Use this when reports, \
         reviews, or other content should be saved to the user's Obsidian vault."
    }

    fn read_only(&self) -> bool {
        false
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "content": { "type": "string", "description": "The content to save" },
                "title": { "type": "string", "description": "Title for the document" },
                "type": {
                    "type": "string",
                    "enum": ["report", "review", "note"],
                    "description": "Type of content (determines template)",
                    "default": "note"
                },
                "tags": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Additional tags for the note",
                    "default": []
                }
            },
            "required": ["content", "title"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<String> {
        let args: SaveToObsidianArgs = parse_args(params)?;
        let request = NoteRequest {
            content: args.content,
            title: args.title,
            content_type: args.content_type,
            tags: args.tags,
        };

        let saved = save_note(&ctx.vault()?, ctx.cwd(), &request, &ctx.now())?;
        Ok(format!(
            "Successfully saved {} '{}' to {}\nProject: {}\nFolder: {}",
            request.content_type,
            request.title,
            saved.path.display(),
            saved.project,
            saved.folder
        ))
    }
}

fn default_response_tags() -> Vec<String> {
    vec!["claude-code".to_string()]
}

#[derive(Debug, Deserialize)]
struct SaveClaudeResponseArgs {
    #[serde(default)]
    content: String,
    #[serde(default)]
    filename: String,
    #[serde(default = "default_response_tags")]
    tags: Vec<String>,
}

/// Untemplated save under a given filename. Delegates to [`save_raw`].
pub struct SaveClaudeResponseTool;

#[async_trait]
impl Tool for SaveClaudeResponseTool {
    fn name(&self) -> &str {
        "save_claude_response"
    }

    fn description(&self) -> &str {
        "Save a response verbatim to the Obsidian vault under the given filename"
    }

    fn read_only(&self) -> bool {
        false
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "content": { "type": "string", "description": "The response content to save" },
                "filename": { "type": "string", "description": "Filename without extension" },
                "tags": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Tags for the note",
                    "default": ["claude-code"]
                }
            },
            "required": ["content", "filename"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<String> {
        let args: SaveClaudeResponseArgs = parse_args(params)?;
        let request = RawNoteRequest {
            content: args.content,
            filename: args.filename,
            tags: args.tags,
        };

        let saved = save_raw(&ctx.vault()?, ctx.cwd(), &request, &ctx.now())?;
        Ok(format!(
            "Successfully saved response to {}",
            saved.path.display()
        ))
    }
}

#[derive(Debug, Deserialize)]
struct ReadObsidianUrlArgs {
    #[serde(default)]
    url: String,
}

/// Read a note addressed by an `obsidian://` URL. Delegates to [`Vault::resolve_url`].
pub struct ReadObsidianUrlTool;

#[async_trait]
impl Tool for ReadObsidianUrlTool {
    fn name(&self) -> &str {
        "read_obsidian_url"
    }

    fn description(&self) -> &str {
        "Read a note from the Obsidian vault given an obsidian://open?vault=...&file=... URL"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "obsidian:// URL of the note" }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<String> {
        let args: ReadObsidianUrlArgs = parse_args(params)?;
        if args.url.trim().is_empty() {
            return Err(VaultError::validation("url must not be empty"));
        }

        let vault = ctx.vault()?;
        let file = vault.resolve_url(&args.url)?;
        Ok(format!(
            "Vault: {}\nFile: {}\nPath: {}\n\n{}",
            file.vault.unwrap_or_else(|| vault.name()),
            file.relative,
            file.path.display(),
            file.content
        ))
    }
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Deserialize)]
struct ListVaultFilesArgs {
    #[serde(default)]
    folder: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

/// List notes in the vault. Delegates to [`Vault::list_files`].
pub struct ListVaultFilesTool;

#[async_trait]
impl Tool for ListVaultFilesTool {
    fn name(&self) -> &str {
        "list_vault_files"
    }

    fn description(&self) -> &str {
        "List markdown files in the Obsidian vault, optionally under a folder"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "folder": { "type": "string", "description": "Folder relative to the vault root", "default": "" },
                "limit": { "type": "integer", "minimum": 0, "description": "Max files to return", "default": 50 }
            }
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<String> {
        let args: ListVaultFilesArgs = parse_args(params)?;
        match ctx.vault()?.list_files(&args.folder, args.limit) {
            Ok(files) => Ok(format_file_list(&files)),
            Err(e) if e.is_not_found() => Ok(format!("Folder not found: {}", args.folder)),
            Err(e) => Err(e),
        }
    }
}

/// `Found N files:` followed by one path per line.
pub fn format_file_list(files: &[String]) -> String {
    let mut out = format!("Found {} files:", files.len());
    for file in files {
        out.push('\n');
        out.push_str(file);
    }
    out
}

fn default_max_depth() -> usize {
    3
}

#[derive(Debug, Deserialize)]
struct GetVaultStructureArgs {
    #[serde(default = "default_max_depth")]
    max_depth: usize,
}

/// Print the vault as a tree. Delegates to [`Vault::build_tree`].
pub struct GetVaultStructureTool;

#[async_trait]
impl Tool for GetVaultStructureTool {
    fn name(&self) -> &str {
        "get_vault_structure"
    }

    fn description(&self) -> &str {
        "Show the folder structure of the Obsidian vault as a tree"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "max_depth": { "type": "integer", "minimum": 0, "description": "Levels to descend", "default": 3 }
            }
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<String> {
        let args: GetVaultStructureArgs = parse_args(params)?;
        ctx.vault()?.build_tree(args.max_depth)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════

/// Registry of tools served over MCP.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty tool registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Create a registry holding the five vault tools.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(SaveToObsidianTool));
        registry.register(Box::new(SaveClaudeResponseTool));
        registry.register(Box::new(ReadObsidianUrlTool));
        registry.register(Box::new(ListVaultFilesTool));
        registry.register(Box::new(GetVaultStructureTool));
        registry
    }

    /// Register a tool. A later tool with a duplicate name is never found.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
