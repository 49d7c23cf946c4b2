//! # Standalone Agent
//!
//! Builds a self-contained `agent ⇄ tools` graph with skills and runs one
//! turn. The model is scripted: it loads `market-sizing`, searches, sums
//! two figures and answers.
//!
//! ```bash
//! cargo run --example standalone_agent
//! ```

mod demo_tools;

use demo_tools::{demo_dir, demo_tools};
use serde_json::json;
use skillgate::testing::ScriptedModel;
use skillgate::{LoggingConfig, Message, ReactAgentBuilder, RunConfig, SkillSource, StateUpdate};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    skillgate::init_logging(&LoggingConfig::default());

    let model = ScriptedModel::new()
        .then_call_tool("load_skill", json!({"skill_name": "market-sizing"}))
        .then_call_tool("web_search", json!({"query": "EV sales 2023"}))
        .then_call_tool("calculate", json!({"numbers": [14.0, 0.5]}))
        .then_reply("Roughly 14.5 million units.");

    let agent = ReactAgentBuilder::new("researcher")
        .model(model.clone().into_model())
        .tools(demo_tools())
        .skills(SkillSource::root(demo_dir().join("skills")))
        .system_prompt("You are a market researcher.")
        .build()?;

    let state = agent
        .invoke(
            StateUpdate::new().with_message(Message::user("How big is the EV market?")),
            &RunConfig::default(),
        )
        .await?;

    for message in &state.messages {
        println!("[{}] {}", message.role, message.content);
    }
    println!("Loaded skills: {:?}", state.loaded_skills);
    println!("Available tools: {:?}", state.available_tools);
    println!("Tools bound per turn: {:?}", model.bound_tool_names());
    Ok(())
}
