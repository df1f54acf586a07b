//! Claude Code hook: queue assistant output for later saving.
//!
//! The hook receives an event as JSON on stdin. Its content is written to
//! `~/.claude/mcp_queue/response_<timestamp>.json` as a ready-made
//! `save_claude_response` argument object. The hook never blocks the
//! assistant: it always answers `{"allow": true, ...}`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::filename::FILENAME_TIMESTAMP_FORMAT;
use crate::Timestamp;

/// Content shorter than this (after trimming) is not queued.
pub const MIN_CONTENT_LEN: usize = 10;

/// Queued request, shaped like the `save_claude_response` arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedResponse {
    pub content: String,
    pub filename: String,
    pub tags: Vec<String>,
}

/// JSON printed back to Claude Code.
#[derive(Debug, Clone, Serialize)]
pub struct HookReply {
    pub allow: bool,
    pub message: String,
}

impl HookReply {
    fn allow(message: impl Into<String>) -> Self {
        Self {
            allow: true,
            message: message.into(),
        }
    }
}

/// `~/.claude/mcp_queue`
pub fn default_queue_dir() -> Result<PathBuf> {
    Ok(crate::install::claude_dir()?.join("mcp_queue"))
}

/// Pull the response text out of a hook event.
///
/// `tool_output` (PostToolUse) is checked first, then `response` (Stop).
/// Strings are used as-is; objects contribute their `content` field or,
/// failing that, their JSON text. Anything else yields the whole event,
/// pretty-printed.
pub fn extract_response_content(event: &Value) -> String {
    for key in ["tool_output", "response"] {
        if let Some(value) = event.get(key) {
            return match value {
                Value::String(s) => s.clone(),
                Value::Object(map) => match map.get("content") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => value.to_string(),
                },
                other => other.to_string(),
            };
        }
    }
    serde_json::to_string_pretty(event).unwrap_or_default()
}

/// Write `content` into `queue_dir`. Returns `None` when it is too short.
pub fn queue_response(queue_dir: &Path, content: &str, now: &Timestamp) -> Result<Option<PathBuf>> {
    if content.trim().chars().count() < MIN_CONTENT_LEN {
        return Ok(None);
    }

    fs::create_dir_all(queue_dir)
        .with_context(|| format!("Failed to create queue directory {}", queue_dir.display()))?;

    let stamp = now.format(FILENAME_TIMESTAMP_FORMAT).to_string();
    let request = QueuedResponse {
        content: content.to_string(),
        filename: format!("claude_response_{}", stamp),
        tags: vec!["claude-code".to_string(), "ai-response".to_string()],
    };

    let path = queue_dir.join(format!("response_{}.json", stamp));
    let text = serde_json::to_string_pretty(&request)?;
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "queued response");
    Ok(Some(path))
}

/// Handle one hook invocation. Errors are folded into the reply.
pub fn run_hook(input: &str, queue_dir: &Path, now: &Timestamp) -> HookReply {
    let outcome = serde_json::from_str::<Value>(input)
        .context("Hook input is not valid JSON")
        .and_then(|event| queue_response(queue_dir, &extract_response_content(&event), now));

    match outcome {
        Ok(Some(path)) => HookReply::allow(format!("Response queued: {}", path.display())),
        Ok(None) => HookReply::allow("Content too short, skipping"),
        Err(e) => HookReply::allow(format!("Hook error: {:#}", e)),
    }
}
