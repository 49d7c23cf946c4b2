//! # Skillgate Agent
//!
//! Skill-scoped tool access for tool-calling agents.
//!
//! - [`SkillGateway`] exposes `load_skill` and `read_reference` to the model,
//!   sandboxed to the configured skill roots
//! - [`AgentStep`] and [`create_agent`] build reasoning steps that only bind
//!   the tools the conversation has unlocked
//! - [`ReactAgentBuilder`] wires a step and a [`ToolNode`] into a compiled
//!   [`graph`] with an `agent ⇄ tools` loop

pub mod builder;
pub mod catalog;
pub mod discovery;
pub mod error;
pub mod gateway;
pub mod graph;
pub mod step;
pub mod validate;

pub use builder::{AgentHandler, Capabilities, HandlerContext, ReactAgentBuilder, SkillSource};
pub use catalog::{available_skills_xml, node_skill_catalog};
pub use discovery::{SkillEntry, SkillIndex, SkillLocation, locate_skill};
pub use error::{
    AgentError, AgentResult, GatewayError, GatewayResult, GraphError, GraphResult,
};
pub use gateway::{
    ALWAYS_AVAILABLE_TOOLS, LOAD_SKILL_TOOL, LoadSkillTool, READ_REFERENCE_TOOL,
    ReadReferenceTool, SkillGateway, SkillLoad,
};
pub use graph::{
    Checkpoint, Checkpointer, CompiledGraph, DEFAULT_MAX_HISTORY, END, GraphNode,
    InMemoryCheckpointer, RunConfig, START, StateGraph, TOOLS_NODE, ToolNode, node_fn,
    route_to_sender, tools_condition,
};
pub use step::{AgentStep, create_agent, create_agent_from_config};
pub use validate::{validate_node_config, validate_node_config_in, validate_skill};
