//! The save pipeline: config → template → filename → front matter → write.
//!
//! Both entry points take the vault, working directory, and clock reading
//! explicitly, so they never consult process-global state.

use std::path::{Path, PathBuf};

use crate::config::{project_name, resolve_config};
use crate::error::{Result, VaultError};
use crate::filename::{derive_filename, raw_filename};
use crate::frontmatter::{front_matter, SOURCE_TAG};
use crate::template::{render_note, ContentType, TemplateVars, TIMESTAMP_FORMAT};
use crate::vault::Vault;
use crate::Timestamp;

/// A templated note to save.
#[derive(Debug, Clone, Default)]
pub struct NoteRequest {
    pub content: String,
    pub title: String,
    pub content_type: ContentType,
    /// Extra tags appended after the generated ones.
    pub tags: Vec<String>,
}

impl NoteRequest {
    pub fn validate(&self) -> Result<()> {
        require_non_empty("content", &self.content)?;
        require_non_empty("title", &self.title)
    }
}

/// Content saved verbatim (no template) under a caller-chosen filename.
#[derive(Debug, Clone)]
pub struct RawNoteRequest {
    pub content: String,
    pub filename: String,
    pub tags: Vec<String>,
}

impl RawNoteRequest {
    pub fn validate(&self) -> Result<()> {
        require_non_empty("content", &self.content)?;
        require_non_empty("filename", &self.filename)
    }
}

/// Where a note ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedNote {
    pub path: PathBuf,
    pub project: String,
    pub folder: String,
    pub filename: String,
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(VaultError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Render `request` with the project's template and write it into the
/// project's vault folder.
///
/// Tags are `claude-code`, the content type, the lowercased project name,
/// then `request.tags`.
pub fn save_note(vault: &Vault, cwd: &Path, request: &NoteRequest, now: &Timestamp) -> Result<SavedNote> {
    request.validate()?;

    let config = resolve_config(cwd);
    let project = project_name(cwd);
    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
    let vars = TemplateVars {
        title: &request.title,
        timestamp: &timestamp,
        project: &project,
        content: &request.content,
    };
    let body = render_note(&config, request.content_type, &vars);

    let mut tags = vec![SOURCE_TAG.to_string(), request.content_type.to_string()];
    if !project.is_empty() {
        tags.push(project.to_lowercase());
    }
    tags.extend(request.tags.iter().cloned());

    let filename = derive_filename(&request.title, now);
    let note = front_matter(&tags, now) + &body;
    let path = vault.write_note(&config.folder, &filename, &note)?;

    Ok(SavedNote {
        path,
        project,
        folder: config.folder,
        filename,
    })
}

/// Write `request.content` with front matter only, into the project's folder.
pub fn save_raw(vault: &Vault, cwd: &Path, request: &RawNoteRequest, now: &Timestamp) -> Result<SavedNote> {
    request.validate()?;

    let config = resolve_config(cwd);
    let filename = raw_filename(&request.filename);
    let note = front_matter(&request.tags, now) + &request.content;
    let path = vault.write_note(&config.folder, &filename, &note)?;

    Ok(SavedNote {
        path,
        project: project_name(cwd),
        folder: config.folder,
        filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{config_path_in, ProjectConfig};
    use crate::frontmatter::split_front_matter;
    use chrono::{FixedOffset, TimeZone};
    use std::fs;
    use tempfile::TempDir;

    fn at() -> Timestamp {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 2, 29, 23, 59, 58)
            .unwrap()
    }

    /// Vault plus a project directory that carries its own config.
    fn fixture(config: &str) -> (TempDir, Vault, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let vault = Vault::open(tmp.path().join("vault")).unwrap();
        let cwd = tmp.path().join("My-App");
        let cfg = config_path_in(&cwd);
        fs::create_dir_all(cfg.parent().unwrap()).unwrap();
        fs::write(cfg, config).unwrap();
        (tmp, vault, cwd)
    }

    #[test]
    fn test_save_note_round_trip() {
        let defaults = serde_json::to_string(&ProjectConfig::default()).unwrap();
        let (_tmp, vault, cwd) = fixture(&defaults);
        let req = NoteRequest {
            content: "Hello".into(),
            title: "Test".into(),
            content_type: ContentType::Note,
            tags: vec!["extra".into()],
        };

        let saved = save_note(&vault, &cwd, &req, &at()).unwrap();
        assert_eq!(saved.filename, "20240229_235958_Test.md");
        assert_eq!(saved.folder, "Claude Code");
        assert_eq!(saved.project, "My-App");
        assert_eq!(saved.path, vault.root().join("Claude Code").join(&saved.filename));

        let text = fs::read_to_string(&saved.path).unwrap();
        let (header, body) = split_front_matter(&text).unwrap();
        assert!(header.contains("tags: ['claude-code', 'note', 'my-app', 'extra']\n"));
        assert!(header.contains("created: 2024-02-29T23:59:58+00:00\n"));
        assert_eq!(
            body,
            "# Test\n\n**Created:** 2024-02-29 23:59:58\n**Project:** My-App\n\nHello"
        );
    }

    #[test]
    fn test_empty_templates_passthrough() {
        let (_tmp, vault, cwd) = fixture(r#"{"folder": "Out", "templates": {}}"#);
        let req = NoteRequest {
            content: "X".into(),
            title: "T".into(),
            content_type: ContentType::Report,
            tags: vec![],
        };

        let saved = save_note(&vault, &cwd, &req, &at()).unwrap();
        assert_eq!(saved.path, vault.root().join("Out").join("20240229_235958_T.md"));
        let text = fs::read_to_string(&saved.path).unwrap();
        assert_eq!(split_front_matter(&text).unwrap().1, "X");
    }

    #[test]
    fn test_validation() {
        let (_tmp, vault, cwd) = fixture("{}");
        let blank_title = NoteRequest {
            content: "c".into(),
            title: "   ".into(),
            ..Default::default()
        };
        let err = save_note(&vault, &cwd, &blank_title, &at()).unwrap_err();
        assert!(matches!(err, VaultError::Validation(ref m) if m.contains("title")));

        let raw = RawNoteRequest {
            content: "".into(),
            filename: "x".into(),
            tags: vec![],
        };
        assert!(matches!(
            save_raw(&vault, &cwd, &raw, &at()),
            Err(VaultError::Validation(_))
        ));
        // Nothing was written.
        assert!(vault.list_files("", 10).unwrap().is_empty());
    }

    #[test]
    fn test_save_raw() {
        let (_tmp, vault, cwd) = fixture(r#"{"folder": "Responses"}"#);
        let req = RawNoteRequest {
            content: "raw body".into(),
            filename: "claude_response_20240229_235958".into(),
            tags: vec!["claude-code".into(), "ai-response".into()],
        };

        let saved = save_raw(&vault, &cwd, &req, &at()).unwrap();
        assert_eq!(
            saved.path,
            vault
                .root()
                .join("Responses")
                .join("claude_response_20240229_235958.md")
        );
        let text = fs::read_to_string(&saved.path).unwrap();
        assert!(text.contains("tags: ['claude-code', 'ai-response']\n"));
        assert!(text.ends_with("---\n\nraw body"));
    }
}
