//! Integration tests for the tool layer.
//!
//! These drive the built-in tools and a custom `Tool` through the
//! registry and the MCP bridge, against a real vault and project
//! directory on disk.

use async_trait::async_trait;
use chrono::{FixedOffset, TimeZone};
use obsidian_mcp::error::Result;
use obsidian_mcp::mcp::McpBridge;
use obsidian_mcp::tools::{Tool, ToolContext, ToolRegistry};
use obsidian_mcp::Timestamp;
use rmcp::model::CallToolResult;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// ─── Test Tool ──────────────────────────────────────────────────────

/// Counts markdown notes in the vault, using the shared context.
struct NoteCountTool;

#[async_trait]
impl Tool for NoteCountTool {
    fn name(&self) -> &str {
        "count_notes"
    }

    fn description(&self) -> &str {
        "Count notes in the vault"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<String> {
        let files = ctx.vault()?.list_files("", usize::MAX)?;
        Ok(files.len().to_string())
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn fixed_time() -> Timestamp {
    FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
        .unwrap()
}

struct Env {
    _tmp: TempDir,
    vault: PathBuf,
    project: PathBuf,
}

fn setup() -> Env {
    let tmp = TempDir::new().unwrap();
    let vault = tmp.path().join("vault");
    let project = tmp.path().join("webapp");
    fs::create_dir_all(project.join("src/deep")).unwrap();
    Env {
        vault,
        project,
        _tmp: tmp,
    }
}

fn context(env: &Env) -> ToolContext {
    ToolContext::new(&env.vault, env.project.join("src/deep")).with_fixed_time(fixed_time())
}

fn write_project_config(env: &Env, config: Value) {
    let dir = env.project.join(".claude");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("obsidian.json"), config.to_string()).unwrap();
}

fn text_of(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| c.as_text().map(|t| t.text.clone()))
        .collect::<Vec<_>>()
        .join("")
}

fn args(value: Value) -> Option<serde_json::Map<String, Value>> {
    value.as_object().cloned()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_review_saved_with_project_template() {
    let env = setup();
    write_project_config(
        &env,
        json!({
            "folder": "Projects/Webapp",
            "templates": { "review": "# Review of {title} in {project}\n\n{content}" }
        }),
    );
    let ctx = context(&env);
    let registry = ToolRegistry::with_builtins();
    let tool = registry.find("save_to_obsidian").unwrap();

    let text = tool
        .execute(
            json!({
                "content": "Looks good.",
                "title": "Auth: login/flow",
                "type": "review",
                "tags": ["security"]
            }),
            &ctx,
        )
        .await
        .unwrap();

    let expected = env
        .vault
        .join("Projects/Webapp/20240305_140709_Auth loginflow.md");
    assert!(text.starts_with("Successfully saved review 'Auth: login/flow' to "));
    assert!(text.contains("Project: deep"));
    assert!(text.contains("Folder: Projects/Webapp"));
    assert!(expected.is_file(), "missing {}", expected.display());

    let note = fs::read_to_string(&expected).unwrap();
    assert_eq!(
        note,
        "---\n\
         created: 2024-03-05T14:07:09+02:00\n\
         source: claude-code\n\
         tags: ['claude-code', 'review', 'deep', 'security']\n\
         ---\n\n\
         # Review of Auth: login/flow in deep\n\nLooks good."
    );
}

#[tokio::test]
async fn test_note_without_config_uses_defaults() {
    let env = setup();
    let ctx = context(&env);
    let tool = ToolRegistry::with_builtins();
    let tool = tool.find("save_to_obsidian").unwrap();

    tool.execute(json!({ "content": "body text", "title": "Plain" }), &ctx)
        .await
        .unwrap();

    let path = env.vault.join("Claude Code/20240305_140709_Plain.md");
    let note = fs::read_to_string(path).unwrap();
    assert!(note.contains("tags: ['claude-code', 'note', 'deep']"));
    assert!(note.contains("# Plain"));
    assert!(note.contains("body text"));
}

#[tokio::test]
async fn test_malformed_config_falls_back_to_defaults() {
    let env = setup();
    let dir = env.project.join(".claude");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("obsidian.json"), "{ not json").unwrap();

    let ctx = context(&env);
    let registry = ToolRegistry::with_builtins();
    let text = registry
        .find("save_to_obsidian")
        .unwrap()
        .execute(json!({ "content": "x", "title": "T" }), &ctx)
        .await
        .unwrap();
    assert!(text.contains("Folder: Claude Code"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_relative_cwd_finds_parent_config() {
    let env = setup();
    write_project_config(&env, json!({ "folder": "FromParent" }));

    let here = std::env::current_dir().unwrap();
    let mut relative = PathBuf::new();
    for _ in here.components().skip(1) {
        relative.push("..");
    }
    relative.push(env.project.join("src").strip_prefix("/").unwrap());
    assert!(relative.is_relative());

    let ctx = ToolContext::new(&env.vault, relative).with_fixed_time(fixed_time());
    let registry = ToolRegistry::with_builtins();
    let text = registry
        .find("save_to_obsidian")
        .unwrap()
        .execute(json!({ "content": "x", "title": "T" }), &ctx)
        .await
        .unwrap();
    assert!(text.contains("Project: src"), "{}", text);
    assert!(text.contains("Folder: FromParent"), "{}", text);
    assert!(env.vault.join("FromParent/20240305_140709_T.md").is_file());
}

#[tokio::test]
async fn test_save_then_read_back_through_url() {
    let env = setup();
    let ctx = context(&env);
    let bridge = McpBridge::new(ctx, ToolRegistry::with_builtins());

    let saved = bridge
        .dispatch(
            "save_claude_response",
            args(json!({ "content": "raw answer", "filename": "Answer One" })),
        )
        .await
        .unwrap();
    assert_eq!(saved.is_error, Some(false));
    assert!(env.vault.join("Claude Code/Answer One.md").is_file());

    let read = bridge
        .dispatch(
            "read_obsidian_url",
            args(json!({ "url": "obsidian://open?vault=vault&file=Claude%20Code%2FAnswer%20One" })),
        )
        .await
        .unwrap();
    assert_eq!(read.is_error, Some(false));
    let text = text_of(&read);
    assert!(text.starts_with("Vault: vault\nFile: Claude Code/Answer One.md\n"));
    assert!(text.contains("tags: ['claude-code']"));
    assert!(text.ends_with("raw answer"));
}

#[tokio::test]
async fn test_url_cannot_escape_vault() {
    let env = setup();
    fs::create_dir_all(&env.vault).unwrap();
    fs::write(env.vault.parent().unwrap().join("secret.md"), "nope").unwrap();

    let bridge = McpBridge::new(context(&env), ToolRegistry::with_builtins());
    let result = bridge
        .dispatch(
            "read_obsidian_url",
            args(json!({ "url": "obsidian://open?vault=v&file=..%2Fsecret" })),
        )
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));
    assert!(text_of(&result).starts_with("read_obsidian_url: "));
}

#[tokio::test]
async fn test_custom_tool_alongside_builtins() {
    let env = setup();
    let mut registry = ToolRegistry::with_builtins();
    registry.register(Box::new(NoteCountTool));
    assert_eq!(registry.len(), 6);

    let bridge = McpBridge::new(context(&env), registry);
    let before = bridge.dispatch("count_notes", None).await.unwrap();
    assert_eq!(text_of(&before), "0");

    for title in ["One", "Two"] {
        let r = bridge
            .dispatch(
                "save_to_obsidian",
                args(json!({ "content": "c", "title": title })),
            )
            .await
            .unwrap();
        assert_eq!(r.is_error, Some(false), "{}", text_of(&r));
    }

    let after = bridge.dispatch("count_notes", None).await.unwrap();
    assert_eq!(text_of(&after), "2");

    let listed = bridge
        .dispatch("list_vault_files", args(json!({ "folder": "Claude Code", "limit": 1 })))
        .await
        .unwrap();
    assert_eq!(
        text_of(&listed),
        "Found 1 files:\nClaude Code/20240305_140709_One.md"
    );
}

#[tokio::test]
async fn test_validation_errors_are_tool_errors() {
    let env = setup();
    let bridge = McpBridge::new(context(&env), ToolRegistry::with_builtins());

    for (tool, params) in [
        ("save_to_obsidian", json!({ "content": "", "title": "t" })),
        ("save_to_obsidian", json!({ "content": "c", "title": "t", "type": "essay" })),
        ("save_claude_response", json!({ "content": "c" })),
        ("read_obsidian_url", json!({})),
    ] {
        let result = bridge.dispatch(tool, args(params)).await.unwrap();
        assert_eq!(result.is_error, Some(true), "{} should fail", tool);
    }
    assert!(!env.vault.join("Claude Code").exists());
}
