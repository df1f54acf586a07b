//! Filesystem access to the Obsidian vault.
//!
//! A [`Vault`] is a directory root. Opening it creates the directory if it
//! is missing, so every later read or write can assume the root exists.
//! Writes overwrite whatever sits at the target path; there is no locking.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Result, VaultError};
use crate::filename::NOTE_EXTENSION;
use crate::url::{relative_vault_path, VaultUrl};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// A note read back through an `obsidian://` URL.
#[derive(Debug, Clone)]
pub struct VaultFile {
    /// `vault` parameter of the URL, as given.
    pub vault: Option<String>,
    /// Path relative to the vault root, `/`-separated.
    pub relative: String,
    /// Absolute path on disk.
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    /// Open the vault at `root`, creating the directory (and parents) if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = std::path::absolute(root).map_err(|e| VaultError::io(root, e))?;
        fs::create_dir_all(&root).map_err(|e| VaultError::io(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory name of the vault root.
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    /// Write `body` to `<root>/<folder>/<filename>` and return the absolute path.
    ///
    /// `folder` may be nested (`Projects/app`) or empty for the vault root.
    /// `filename` must be a single path component.
    pub fn write_note(&self, folder: &str, filename: &str, body: &str) -> Result<PathBuf> {
        if filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\', '\0'])
        {
            return Err(VaultError::validation(format!(
                "invalid note filename '{}'",
                filename
            )));
        }

        let dir = self.root.join(relative_vault_path(folder)?);
        fs::create_dir_all(&dir).map_err(|e| VaultError::io(&dir, e))?;

        let path = dir.join(filename);
        fs::write(&path, body).map_err(|e| VaultError::io(&path, e))?;
        tracing::info!(path = %path.display(), bytes = body.len(), "wrote note");
        Ok(path)
    }

    /// Resolve an `obsidian://` URL to a file inside this vault and read it.
    ///
    /// A path without an extension gets `.md` appended.
    pub fn resolve_url(&self, url: &str) -> Result<VaultFile> {
        let parsed = VaultUrl::parse(url)?;
        let mut relative = parsed.relative_path()?;
        if relative.as_os_str().is_empty() {
            return Err(VaultError::validation("URL 'file' parameter names no file"));
        }
        if relative.extension().is_none() {
            relative.set_extension(NOTE_EXTENSION);
        }

        let path = self.root.join(&relative);
        if !path.exists() {
            return Err(VaultError::NotFound(path));
        }
        let content = fs::read_to_string(&path).map_err(|e| VaultError::io(&path, e))?;
        tracing::debug!(path = %path.display(), "read note from URL");

        Ok(VaultFile {
            vault: parsed.vault,
            relative: slash_path(&relative),
            path,
            content,
        })
    }

    /// Collect up to `limit` note paths under `folder` (the root when empty),
    /// relative to the vault root.
    ///
    /// Hidden directories such as `.obsidian` are not descended into.
    pub fn list_files(&self, folder: &str, limit: usize) -> Result<Vec<String>> {
        let base = self.root.join(relative_vault_path(folder)?);
        if !base.is_dir() {
            return Err(VaultError::NotFound(base));
        }

        let mut files = Vec::new();
        if limit == 0 {
            return Ok(files);
        }

        let walker = WalkDir::new(&base)
            .sort_by(|a, b| compare_names(a.file_name(), b.file_name()))
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| base.clone());
                VaultError::io(path, e.into())
            })?;
            if !entry.file_type().is_file() || !is_note(entry.path()) {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            files.push(slash_path(relative));
            if files.len() >= limit {
                break;
            }
        }
        Ok(files)
    }

    /// Render subdirectories and notes as a tree, at most `max_depth` levels deep.
    ///
    /// Siblings are sorted by name, ignoring case. The first line is the vault name.
    pub fn build_tree(&self, max_depth: usize) -> Result<String> {
        let mut out = format!("{}/\n", self.name());
        if max_depth > 0 {
            write_tree(&self.root, "", 1, max_depth, &mut out)?;
        }
        Ok(out)
    }
}

fn write_tree(dir: &Path, prefix: &str, depth: usize, max_depth: usize, out: &mut String) -> Result<()> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| VaultError::io(dir, e))? {
        let entry = entry.map_err(|e| VaultError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if is_hidden(entry.file_name().as_os_str()) {
            continue;
        }
        let file_type = entry.file_type().map_err(|e| VaultError::io(entry.path(), e))?;
        if file_type.is_dir() {
            entries.push((name, entry.path(), true));
        } else if file_type.is_file() && is_note(&entry.path()) {
            entries.push((name, entry.path(), false));
        }
    }
    entries.sort_by(|a, b| compare_names(OsStr::new(&a.0), OsStr::new(&b.0)));

    let count = entries.len();
    for (i, (name, path, is_dir)) in entries.into_iter().enumerate() {
        let last = i + 1 == count;
        out.push_str(prefix);
        out.push_str(if last { LAST_BRANCH } else { BRANCH });
        out.push_str(&name);
        if is_dir {
            out.push('/');
        }
        out.push('\n');

        if is_dir && depth < max_depth {
            let child_prefix = format!("{}{}", prefix, if last { SPACE } else { PIPE });
            write_tree(&path, &child_prefix, depth + 1, max_depth, out)?;
        }
    }
    Ok(())
}

/// Case-insensitive name order; names equal ignoring case fall back to
/// byte order, so the result is total and stable.
fn compare_names(a: &OsStr, b: &OsStr) -> Ordering {
    let (a, b) = (a.to_string_lossy(), b.to_string_lossy());
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(&b))
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn is_note(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == NOTE_EXTENSION)
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
