//! Sandbox containment errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to resolve a path inside its sandbox root.
#[derive(Debug, Error)]
pub enum PathError {
    /// The resolved path is the base itself or lies outside it.
    #[error("Path {} resolves outside {}", .path.display(), .base.display())]
    Traversal { path: PathBuf, base: PathBuf },

    /// The base directory could not be canonicalized.
    #[error("Failed to resolve {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PathError {
    /// Whether this error is a containment violation.
    pub fn is_traversal(&self) -> bool {
        matches!(self, PathError::Traversal { .. })
    }
}

/// Result type alias for containment checks.
pub type PathResult<T> = Result<T, PathError>;
