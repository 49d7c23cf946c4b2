//! # Skillgate Testing
//!
//! Test doubles and fixtures for skill-scoped agents.
//!
//! ## Components
//!
//! - **Mock Tools**: tools with canned responses and call history
//! - **Scripted Model**: a chat model replaying queued responses and
//!   recording every request it receives
//! - **Skill Root Fixture**: temporary directories holding skills, reference
//!   files and node configs
//!
//! ## Usage
//!
//! ```rust
//! use skillgate_testing::{MockTool, ScriptedModel, SkillRootFixture};
//! use serde_json::json;
//!
//! let fixture = SkillRootFixture::new();
//! fixture.skill("market-sizing", "Estimate market size", &["calculate"], "# Steps");
//!
//! let calculate = MockTool::new("calculate").with_response("42");
//! let model = ScriptedModel::new()
//!     .then_call_tool("load_skill", json!({"skill_name": "market-sizing"}))
//!     .then_reply("done");
//! # let _ = (calculate, model);
//! ```

/// Temporary on-disk skill roots and node configs
pub mod fixtures;
/// Mock tools for predictable testing
pub mod mock_tools;
/// Scripted chat model
pub mod scripted_model;

pub use fixtures::{SkillRootFixture, node_document, skill_descriptor};
pub use mock_tools::MockTool;
pub use scripted_model::ScriptedModel;
