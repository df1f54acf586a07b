//! Installation helpers: register the server with Claude Code and scaffold
//! per-project configs.
//!
//! Registration edits the Claude Code settings file in place. Keys other
//! than our own `mcpServers` entry are preserved; a settings file that is
//! not valid JSON is backed up before being replaced.

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{config_path_in, project_name, ProjectConfig};
use crate::mcp::SERVER_NAME;
use crate::template::ContentType;

/// Environment variable naming the vault root.
pub const VAULT_ENV: &str = "OBSIDIAN_VAULT_PATH";

const MCP_SERVERS_KEY: &str = "mcpServers";
const ENV_FILE: &str = "obsidian.env";

/// `~/.claude`
pub fn claude_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".claude"))
}

/// `~/Documents/ObsidianVault`, used when no vault path is configured.
pub fn default_vault_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join("Documents").join("ObsidianVault"))
}

/// How the assistant should launch the server.
#[derive(Debug, Clone)]
pub struct ServerRegistration {
    pub command: String,
    pub args: Vec<String>,
    pub vault: PathBuf,
}

impl ServerRegistration {
    fn to_json(&self) -> Value {
        json!({
            "command": self.command,
            "args": self.args,
            "env": { VAULT_ENV: self.vault.display().to_string() }
        })
    }
}

/// Result of [`register_server`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterOutcome {
    pub settings: PathBuf,
    /// Set when an unparseable settings file was moved aside.
    pub backup: Option<PathBuf>,
    /// Whether an existing registration was overwritten.
    pub replaced: bool,
}

/// Add or replace the `obsidian-claude-code` entry under `mcpServers`.
pub fn register_server(settings_path: &Path, registration: &ServerRegistration) -> Result<RegisterOutcome> {
    let mut backup = None;
    let mut settings = Map::new();

    if settings_path.exists() {
        let text = fs::read_to_string(settings_path)
            .with_context(|| format!("Failed to read settings file: {}", settings_path.display()))?;
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => settings = map,
            Ok(_) | Err(_) => {
                let bak = backup_path(settings_path);
                fs::copy(settings_path, &bak)
                    .with_context(|| format!("Failed to back up settings to {}", bak.display()))?;
                tracing::warn!(backup = %bak.display(), "settings file was not a JSON object, backed it up");
                backup = Some(bak);
            }
        }
    }

    let servers = settings
        .entry(MCP_SERVERS_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    if !servers.is_object() {
        *servers = Value::Object(Map::new());
    }
    let replaced = servers
        .as_object_mut()
        .map(|m| m.insert(SERVER_NAME.to_string(), registration.to_json()).is_some())
        .unwrap_or(false);

    if let Some(parent) = settings_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(&Value::Object(settings))?;
    fs::write(settings_path, text + "\n")
        .with_context(|| format!("Failed to write settings file: {}", settings_path.display()))?;
    tracing::info!(settings = %settings_path.display(), replaced, "registered MCP server");

    Ok(RegisterOutcome {
        settings: settings_path.to_path_buf(),
        backup,
        replaced,
    })
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Write `<dir>/obsidian.env` with the vault path, for shells and scripts.
pub fn write_env_file(dir: &Path, vault: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(ENV_FILE);
    fs::write(&path, format!("{}={}\n", VAULT_ENV, vault.display()))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Result of [`init_project_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInit {
    pub path: PathBuf,
    pub folder: String,
    /// `false` when a config already existed and was left alone.
    pub created: bool,
}

/// Config written by `init-project`: richer templates than the built-in
/// defaults, and a per-project folder.
pub fn project_config_template(folder: &str) -> ProjectConfig {
    let mut templates = BTreeMap::new();
    templates.insert(
        ContentType::Report.to_string(),
        "# {title}\n\n**📋 Report Generated**\n- **Date:** {timestamp}\n- **Project:** {project}\n\
         - **Type:** Technical Report\n\n---\n\n{content}\n\n---\n\n*Generated by Claude Code*"
            .to_string(),
    );
    templates.insert(
        ContentType::Review.to_string(),
        "# Code Review: {title}\n\n**👀 Review Details**\n- **Date:** {timestamp}\n- **Project:** {project}\n\
         - **Reviewer:** Claude Code\n\n---\n\n## Summary\n\n{content}\n\n---\n\n*Automated review by Claude Code*"
            .to_string(),
    );
    templates.insert(
        ContentType::Note.to_string(),
        "# {title}\n\n**📝 Note**\n- **Created:** {timestamp}\n- **Project:** {project}\n\n---\n\n{content}"
            .to_string(),
    );
    ProjectConfig {
        folder: folder.to_string(),
        templates,
    }
}

/// Create `<dir>/.claude/obsidian.json` unless it exists.
///
/// `folder` defaults to `Projects/<dir name>`.
pub fn init_project_config(dir: &Path, folder: Option<&str>) -> Result<ProjectInit> {
    let path = config_path_in(dir);
    let folder = folder
        .map(str::to_string)
        .unwrap_or_else(|| format!("Projects/{}", project_name(dir)));

    if path.exists() {
        return Ok(ProjectInit {
            path,
            folder,
            created: false,
        });
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(&project_config_template(&folder))?;
    fs::write(&path, text + "\n")
        .with_context(|| format!("Failed to write project config: {}", path.display()))?;

    Ok(ProjectInit {
        path,
        folder,
        created: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{lookup_config, ConfigLookup};
    use tempfile::TempDir;

    fn registration() -> ServerRegistration {
        ServerRegistration {
            command: "/usr/local/bin/obsidian-mcp".into(),
            args: vec!["serve".into()],
            vault: PathBuf::from("/notes"),
        }
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_register_into_new_file() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join(".claude/settings.json");

        let outcome = register_server(&settings, &registration()).unwrap();
        assert_eq!(outcome.backup, None);
        assert!(!outcome.replaced);

        let json = read_json(&settings);
        let entry = &json["mcpServers"]["obsidian-claude-code"];
        assert_eq!(entry["command"], "/usr/local/bin/obsidian-mcp");
        assert_eq!(entry["args"], json!(["serve"]));
        assert_eq!(entry["env"]["OBSIDIAN_VAULT_PATH"], "/notes");
    }

    #[test]
    fn test_register_preserves_other_settings() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join("settings.json");
        fs::write(
            &settings,
            r#"{"theme": "dark", "mcpServers": {"other": {"command": "x"}, "obsidian-claude-code": {}}}"#,
        )
        .unwrap();

        let outcome = register_server(&settings, &registration()).unwrap();
        assert!(outcome.replaced);

        let json = read_json(&settings);
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["mcpServers"]["other"]["command"], "x");
        assert_eq!(json["mcpServers"]["obsidian-claude-code"]["args"], json!(["serve"]));
    }

    #[test]
    fn test_register_backs_up_invalid_json() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join("settings.json");
        fs::write(&settings, "{ broken").unwrap();

        let outcome = register_server(&settings, &registration()).unwrap();
        let bak = tmp.path().join("settings.json.bak");
        assert_eq!(outcome.backup, Some(bak.clone()));
        assert_eq!(fs::read_to_string(bak).unwrap(), "{ broken");
        assert!(read_json(&settings)["mcpServers"]["obsidian-claude-code"].is_object());
    }

    #[test]
    fn test_write_env_file() {
        let tmp = TempDir::new().unwrap();
        let path = write_env_file(tmp.path(), Path::new("/notes")).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "OBSIDIAN_VAULT_PATH=/notes\n");
    }

    #[test]
    fn test_init_project_config_is_discoverable_and_not_overwritten() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("webapp");
        fs::create_dir_all(&dir).unwrap();

        let init = init_project_config(&dir, None).unwrap();
        assert!(init.created);
        assert_eq!(init.folder, "Projects/webapp");

        match lookup_config(&dir.join("src")) {
            ConfigLookup::Found { config, .. } => {
                assert_eq!(config.folder, "Projects/webapp");
                assert_eq!(config.templates.len(), 3);
            }
            other => panic!("expected Found, got {:?}", other),
        }

        let again = init_project_config(&dir, Some("Elsewhere")).unwrap();
        assert!(!again.created);
        match lookup_config(&dir) {
            ConfigLookup::Found { config, .. } => assert_eq!(config.folder, "Projects/webapp"),
            other => panic!("expected Found, got {:?}", other),
        }
    }
}
