//! Error taxonomy for vault operations.
//!
//! Tool handlers surface these as MCP error results; the server process
//! keeps running. Malformed project configs are not errors here, see
//! [`crate::config::ConfigLookup::Malformed`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    /// A required argument is missing, empty, or has the wrong shape.
    #[error("{0}")]
    Validation(String),

    /// Wrong scheme, unparseable URL, or a path segment that would escape the vault.
    #[error("invalid vault URL: {0}")]
    InvalidUrl(String),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VaultError {
    pub fn validation(msg: impl Into<String>) -> Self {
        VaultError::Validation(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VaultError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, VaultError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;
