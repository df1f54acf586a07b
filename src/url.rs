//! `obsidian://` URL parsing.
//!
//! Obsidian links to a note as
//! `obsidian://open?vault=<vault name>&file=<percent-encoded path>`.
//! Only the `file` parameter decides which file is read; `vault` is kept
//! for reporting.

use std::path::PathBuf;

use crate::error::{Result, VaultError};

pub const VAULT_SCHEME: &str = "obsidian";

/// A parsed vault URL with decoded parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultUrl {
    /// Path after the scheme, e.g. `open`.
    pub action: String,
    pub vault: Option<String>,
    /// Decoded `file` parameter, still `/`-separated.
    pub file: String,
}

impl VaultUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        let (scheme, rest) = url
            .split_once(':')
            .ok_or_else(|| VaultError::InvalidUrl(format!("missing scheme in '{}'", url)))?;
        if !scheme.eq_ignore_ascii_case(VAULT_SCHEME) {
            return Err(VaultError::InvalidUrl(format!(
                "expected {}:// URL, got scheme '{}'",
                VAULT_SCHEME, scheme
            )));
        }

        let rest = rest.strip_prefix("//").unwrap_or(rest);
        let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
        let (action, query) = rest.split_once('?').unwrap_or((rest, ""));

        let mut vault = None;
        let mut file = None;
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match decode(key)?.as_str() {
                "vault" if vault.is_none() => vault = Some(decode(value)?),
                "file" if file.is_none() => file = Some(decode(value)?),
                _ => {}
            }
        }

        let file = file
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| VaultError::validation("missing required 'file' parameter in URL"))?;

        Ok(Self {
            action: action.trim_end_matches('/').to_string(),
            vault,
            file,
        })
    }

    /// The `file` parameter as a path relative to the vault root.
    pub fn relative_path(&self) -> Result<PathBuf> {
        relative_vault_path(&self.file)
    }
}

fn decode(raw: &str) -> Result<String> {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .map_err(|e| VaultError::InvalidUrl(format!("bad percent-encoding in '{}': {}", raw, e)))
}

/// Turn a `/`-separated path into a relative [`PathBuf`] that cannot leave
/// the vault.
///
/// Empty segments are skipped (so leading or doubled slashes are harmless).
/// Segments equal to `.` or `..`, or containing `\` or NUL, are rejected.
pub fn relative_vault_path(path: &str) -> Result<PathBuf> {
    let mut out = PathBuf::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." || segment.contains(['\\', '\0']) {
            return Err(VaultError::InvalidUrl(format!(
                "path segment '{}' is not allowed in '{}'",
                segment, path
            )));
        }
        out.push(segment);
    }
    Ok(out)
}
