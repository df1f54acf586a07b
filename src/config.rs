//! Project configuration discovery.
//!
//! A project opts into custom behavior by placing `.claude/obsidian.json`
//! somewhere at or above its working directory:
//!
//! ```json
//! {
//!   "folder": "Projects/my-app",
//!   "templates": {
//!     "report": "# {title}\n\n{content}",
//!     "note": "{content}"
//!   }
//! }
//! ```
//!
//! The nearest file wins. When no file exists, or the nearest one cannot be
//! parsed, the built-in [`ProjectConfig::default`] applies. Config is
//! re-read on every request; nothing is cached.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::template::ContentType;

/// Directory holding the project config, relative to a candidate directory.
pub const CONFIG_DIR: &str = ".claude";
/// Project config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "obsidian.json";
/// Vault folder used when a config does not name one.
pub const DEFAULT_FOLDER: &str = "Claude Code";

const DEFAULT_REPORT_TEMPLATE: &str =
    "# {title}\n\n**Generated:** {timestamp}\n**Project:** {project}\n\n{content}";
const DEFAULT_REVIEW_TEMPLATE: &str =
    "# Code Review: {title}\n\n**Generated:** {timestamp}\n**Project:** {project}\n\n{content}";
const DEFAULT_NOTE_TEMPLATE: &str =
    "# {title}\n\n**Created:** {timestamp}\n**Project:** {project}\n\n{content}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Destination folder, relative to the vault root. May contain `/`.
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Content-type name → template string.
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
}

fn default_folder() -> String {
    DEFAULT_FOLDER.to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        let mut templates = BTreeMap::new();
        templates.insert(
            ContentType::Report.as_str().to_string(),
            DEFAULT_REPORT_TEMPLATE.to_string(),
        );
        templates.insert(
            ContentType::Review.as_str().to_string(),
            DEFAULT_REVIEW_TEMPLATE.to_string(),
        );
        templates.insert(
            ContentType::Note.as_str().to_string(),
            DEFAULT_NOTE_TEMPLATE.to_string(),
        );
        Self {
            folder: default_folder(),
            templates,
        }
    }
}

impl ProjectConfig {
    /// The configured template for `content_type`, if any.
    pub fn template_for(&self, content_type: ContentType) -> Option<&str> {
        self.templates.get(content_type.as_str()).map(String::as_str)
    }
}

/// Outcome of searching for a project config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLookup {
    Found { path: PathBuf, config: ProjectConfig },
    /// The nearest config file exists but could not be read or parsed.
    Malformed { path: PathBuf, reason: String },
    NotFound,
}

impl ConfigLookup {
    /// Collapse the lookup into a usable config, falling back to the default.
    pub fn into_config(self) -> ProjectConfig {
        match self {
            ConfigLookup::Found { config, .. } => config,
            ConfigLookup::Malformed { path, reason } => {
                tracing::warn!(
                    path = %path.display(),
                    %reason,
                    "ignoring malformed project config, using defaults"
                );
                ProjectConfig::default()
            }
            ConfigLookup::NotFound => ProjectConfig::default(),
        }
    }
}

/// Path of the config file a given directory would carry.
pub fn config_path_in(dir: &Path) -> PathBuf {
    dir.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Walk from `cwd` up to the filesystem root and report the nearest config.
///
/// The search stops at the first existing file, even if it fails to parse.
pub fn lookup_config(cwd: &Path) -> ConfigLookup {
    let cwd = absolute_dir(cwd);
    for dir in cwd.ancestors() {
        let path = config_path_in(dir);
        if !path.is_file() {
            continue;
        }
        tracing::debug!(path = %path.display(), "found project config");
        return match parse_config_file(&path) {
            Ok(config) => ConfigLookup::Found { path, config },
            Err(reason) => ConfigLookup::Malformed { path, reason },
        };
    }
    tracing::debug!(cwd = %cwd.display(), "no project config found");
    ConfigLookup::NotFound
}

/// Resolve the effective config for `cwd`. Never fails.
pub fn resolve_config(cwd: &Path) -> ProjectConfig {
    lookup_config(cwd).into_config()
}

fn parse_config_file(path: &Path) -> Result<ProjectConfig, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    // Derived `Deserialize` also accepts a JSON array in field order.
    match serde_json::from_str::<serde_json::Value>(&text).map_err(|e| e.to_string())? {
        value @ serde_json::Value::Object(_) => {
            serde_json::from_value(value).map_err(|e| e.to_string())
        }
        other => Err(format!("expected a JSON object, found {}", json_kind(&other))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Project name used in templates and tags: the last component of `cwd`.
pub fn project_name(cwd: &Path) -> String {
    absolute_dir(cwd)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// `cwd` resolved against the process working directory, with `.` and `..`
/// folded lexically so that `ancestors()` reaches the filesystem root.
fn absolute_dir(cwd: &Path) -> PathBuf {
    let cwd = if cwd.as_os_str().is_empty() { Path::new(".") } else { cwd };
    let absolute = std::path::absolute(cwd).unwrap_or_else(|_| cwd.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
