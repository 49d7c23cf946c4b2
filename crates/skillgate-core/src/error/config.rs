//! Errors for node configs, skill bundles and the workspace configuration.

use super::document::DocumentError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to build a [`NodeConfig`](crate::node::NodeConfig) from its document.
#[derive(Debug, Error)]
pub enum NodeConfigError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Node config {} is missing required field '{field}'", .path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("Node config {} has invalid field '{field}': expected {expected}", .path.display())]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        expected: &'static str,
    },
}

/// Failure to build a [`SkillBundle`](crate::skill::SkillBundle) from its directory.
#[derive(Debug, Error)]
pub enum SkillError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Skill {} has invalid field '{field}': expected {expected}", .path.display())]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        expected: &'static str,
    },

    /// Listing the bundle's reference files failed.
    #[error("Failed to list skill directory {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SkillError {
    /// Whether the bundle's descriptor was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SkillError::Document(doc) if doc.is_not_found())
    }
}

/// Result type alias for skill bundle operations.
pub type SkillResult<T> = Result<T, SkillError>;

/// Failure to load or validate a [`SkillgateConfig`](crate::config::SkillgateConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
