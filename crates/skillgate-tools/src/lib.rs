//! # Skillgate Tools
//!
//! The [`ToolRegistry`]: a name-keyed collection of tools shared by the
//! configuration validator, the skill gateway and the agent steps.

/// Name-keyed tool storage and dispatch.
pub mod registry;

pub use registry::ToolRegistry;
pub use skillgate_core::{ExecutionResult, FailureReason, Tool, ToolSpec};
