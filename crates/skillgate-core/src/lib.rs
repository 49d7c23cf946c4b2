//! # Skillgate Core
//!
//! Core types for skill-scoped tool access: the frontmatter document format,
//! skill bundles and node configs read from it, the tool and chat model
//! contracts, conversation state with its reducers, and sandbox containment.

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod identifiers;
pub mod message;
pub mod model;
pub mod node;
pub mod security;
pub mod skill;
pub mod state;
pub mod tool;

pub use config::{LogFormat, LoggingConfig, SkillgateConfig};
pub use error::{
    ConfigError, DocumentError, ModelError, ModelResult, NodeConfigError, PathError, SkillError,
};
pub use frontmatter::{Frontmatter, Metadata, parse_frontmatter, parse_frontmatter_str};
pub use identifiers::{IdValidationError, IdValidator, ReferenceFileName, SkillName, SkillNameRule};
pub use message::{Message, MessageRole, ToolCallRequest};
pub use model::{BoundModel, ChatModel, ModelRequest, bind_tools};
pub use node::NodeConfig;
pub use security::{ContainedPath, Sandbox};
pub use skill::{SKILL_FILE, SkillBundle};
pub use state::{AgentState, StateReducers, StateUpdate};
pub use tool::{ExecutionResult, FailureReason, Tool, ToolSpec};
