//! Errors raised while reading metadata-plus-body documents.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to read or decode a frontmatter document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document does not exist.
    #[error("Document not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The document exists but could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The metadata block was rejected by the YAML decoder.
    #[error("Invalid frontmatter in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The metadata block decoded to something other than a mapping.
    #[error("Frontmatter in {} must be a key-value mapping", .path.display())]
    NotAMapping { path: PathBuf },
}

impl DocumentError {
    /// Whether the underlying document was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentError::NotFound { .. })
    }
}

/// Result type alias for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;
