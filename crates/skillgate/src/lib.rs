//! # Skillgate
//!
//! Skill-scoped tool access for tool-calling LLM agents.
//!
//! Skills are directories holding a `SKILL.md` descriptor (metadata plus
//! instructions) and optional reference files. An agent starts with every
//! tool bound and a `load_skill` tool listing the discoverable skills; loading
//! a skill returns its instructions and narrows the tools bound on later turns
//! to the ones the skill declares.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use skillgate::{Message, ReactAgentBuilder, RunConfig, SkillSource, StateUpdate};
//!
//! let agent = ReactAgentBuilder::new("researcher")
//!     .model(model)
//!     .tools(vec![web_search, calculate])
//!     .skills(SkillSource::root("skills"))
//!     .build()?;
//!
//! let state = agent
//!     .invoke(StateUpdate::new().with_message(Message::user("Size the EV market")), &RunConfig::default())
//!     .await?;
//! ```

pub mod logging;

pub use skillgate_agent as agent;
pub use skillgate_core as core;
pub use skillgate_tools as tools;

#[cfg(feature = "testing")]
pub use skillgate_testing as testing;

// ============================================================================
// Documents and configuration
// ============================================================================

pub use skillgate_core::{
    Frontmatter, LogFormat, LoggingConfig, Metadata, NodeConfig, SKILL_FILE, SkillBundle,
    SkillgateConfig, parse_frontmatter, parse_frontmatter_str,
};

// ============================================================================
// Identifiers and containment
// ============================================================================

pub use skillgate_core::{
    ContainedPath, IdValidationError, IdValidator, ReferenceFileName, Sandbox, SkillName,
    SkillNameRule,
};

// ============================================================================
// Tools, models and state
// ============================================================================

pub use skillgate_core::{
    AgentState, BoundModel, ChatModel, ExecutionResult, FailureReason, Message, MessageRole,
    ModelRequest, StateReducers, StateUpdate, Tool, ToolCallRequest, ToolSpec, bind_tools,
};
pub use skillgate_tools::ToolRegistry;

// ============================================================================
// Gateway, steps and graphs
// ============================================================================

pub use skillgate_agent::{
    AgentHandler, AgentStep, Capabilities, Checkpointer, CompiledGraph, END, GraphNode,
    HandlerContext, InMemoryCheckpointer, LOAD_SKILL_TOOL, READ_REFERENCE_TOOL,
    ReactAgentBuilder, RunConfig, START, SkillGateway, SkillIndex, SkillSource, StateGraph,
    ToolNode, create_agent, create_agent_from_config, node_skill_catalog, route_to_sender,
    tools_condition, validate_node_config, validate_skill,
};

// ============================================================================
// Errors
// ============================================================================

pub use skillgate_agent::{AgentError, GatewayError, GraphError};
pub use skillgate_core::{
    ConfigError, DocumentError, ModelError, NodeConfigError, PathError, SkillError,
};

pub use logging::init_logging;
