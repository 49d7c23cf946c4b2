//! Error types for the gateway, agent construction and graph execution.

use skillgate_core::error::{ConfigError, ModelError, NodeConfigError, SkillError};
use skillgate_core::tool::FailureReason;
use std::path::PathBuf;
use thiserror::Error;

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

fn format_violations(errors: &[String]) -> String {
    errors.iter().map(|error| format!("\n  - {error}")).collect()
}

/// A rejected `load_skill` or `read_reference` call.
///
/// These are shown to the model as tool results so it can pick a different
/// skill or file; they never fail the step that issued the call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid skill name '{name}'. Available skills: {}", format_available(.available))]
    InvalidSkillName { name: String, available: Vec<String> },

    /// The skill (or file) resolved outside its sandbox.
    #[error("Path traversal detected")]
    PathTraversal { name: String },

    #[error("Skill '{name}' not found. Available skills: {}", format_available(.available))]
    SkillNotFound { name: String, available: Vec<String> },

    #[error("Invalid file name '{file}'")]
    InvalidFileName { file: String },

    #[error("Reference file '{file}' not found in skill '{skill}'")]
    ReferenceNotFound { file: String, skill: String },

    #[error(transparent)]
    Skill(#[from] SkillError),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GatewayError {
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::InvalidSkillName { .. } => "INVALID_SKILL_NAME",
            GatewayError::PathTraversal { .. } => "PATH_TRAVERSAL",
            GatewayError::SkillNotFound { .. } => "SKILL_NOT_FOUND",
            GatewayError::InvalidFileName { .. } => "INVALID_FILE_NAME",
            GatewayError::ReferenceNotFound { .. } => "REFERENCE_NOT_FOUND",
            GatewayError::Skill(_) => "SKILL_ERROR",
            GatewayError::Io { .. } => "IO_ERROR",
        }
    }
}

impl From<GatewayError> for FailureReason {
    fn from(err: GatewayError) -> Self {
        let message = err.to_string();
        match err {
            GatewayError::InvalidSkillName { .. } | GatewayError::InvalidFileName { .. } => {
                FailureReason::InvalidInput { message }
            }
            GatewayError::PathTraversal { .. } => FailureReason::PermissionDenied { message },
            GatewayError::SkillNotFound { .. } | GatewayError::ReferenceNotFound { .. } => {
                FailureReason::NotFound { message }
            }
            GatewayError::Skill(_) | GatewayError::Io { .. } => FailureReason::IoError { message },
        }
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors raised by the graph collaborator.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Graph has no entry point")]
    MissingEntryPoint,

    #[error("Unknown node '{name}'")]
    UnknownNode { name: String },

    #[error("Node '{name}' is already defined")]
    DuplicateNode { name: String },

    #[error("Node name '{name}' is reserved")]
    ReservedNodeName { name: String },

    #[error("Recursion limit of {limit} steps reached without hitting a stop condition")]
    RecursionLimit { limit: usize },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Node '{node}' failed: {message}")]
    Node { node: String, message: String },

    #[error("Checkpoint error: {message}")]
    Checkpoint { message: String },
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Construction-time failures. Nothing is built when one of these occurs.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Every validation violation for the node, one per line.
    #[error("Invalid node config '{node}':{}", format_violations(.errors))]
    InvalidNodeConfig { node: String, errors: Vec<String> },

    #[error(transparent)]
    NodeConfig(#[from] NodeConfigError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Agent '{node}' has no model")]
    MissingModel { node: String },

    #[error("Invalid node name '{name}': {reason}")]
    InvalidNodeName { name: String, reason: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl AgentError {
    /// Get the error code suitable for logging or reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            AgentError::InvalidNodeConfig { .. } => "INVALID_NODE_CONFIG",
            AgentError::NodeConfig(_) => "NODE_CONFIG_ERROR",
            AgentError::Config(_) => "CONFIG_ERROR",
            AgentError::MissingModel { .. } => "MISSING_MODEL",
            AgentError::InvalidNodeName { .. } => "INVALID_NODE_NAME",
            AgentError::Graph(_) => "GRAPH_ERROR",
        }
    }
}

/// Result type for agent construction.
pub type AgentResult<T> = Result<T, AgentError>;
