//! # Multi-Agent Pipeline
//!
//! Loads `demos/skillgate.toml`, builds a researcher agent as its own
//! compiled graph and plugs it into a parent graph ahead of a config-built
//! analyst step. Each thread is checkpointed, so a second turn resumes the
//! conversation.
//!
//! ```bash
//! cargo run --example multi_agent
//! ```

mod demo_tools;

use demo_tools::{demo_dir, demo_tools};
use serde_json::json;
use skillgate::testing::ScriptedModel;
use skillgate::{
    InMemoryCheckpointer, Message, ReactAgentBuilder, RunConfig, SkillGateway, SkillSource,
    SkillgateConfig, StateGraph, StateUpdate, ToolRegistry, create_agent_from_config,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = SkillgateConfig::load_from_file(demo_dir().join("skillgate.toml"))?;
    skillgate::init_logging(&config.logging);

    let registry = Arc::new(ToolRegistry::from_tools(demo_tools()));
    let gateway = Arc::new(SkillGateway::from_config(&config, registry));

    let researcher = ReactAgentBuilder::new("researcher")
        .model(
            ScriptedModel::new()
                .then_call_tool("load_skill", json!({"skill_name": "market-sizing"}))
                .then_call_tool("web_search", json!({"query": "EV sales"}))
                .then_reply("14 million EVs sold.")
                .then_reply("Nothing new to add.")
                .into_model(),
        )
        .tools(demo_tools())
        .skills(SkillSource::Gateway(gateway.clone()))
        .build()?;

    let analyst = create_agent_from_config(
        &config,
        "analyst",
        &gateway,
        ScriptedModel::new()
            .then_reply("That is about 17% of new car sales.")
            .then_reply("Still 17%.")
            .into_model(),
        Vec::new(),
    )?;

    let mut graph = StateGraph::new();
    graph.add_node("researcher", Arc::new(researcher))?;
    graph.add_node("analyst", Arc::new(analyst))?;
    graph
        .set_entry_point("researcher")
        .add_edge("researcher", "analyst")
        .set_finish_point("analyst");
    let pipeline = graph.compile_with_checkpointer(Arc::new(InMemoryCheckpointer::new()))?;

    let run = RunConfig::from_config(&config, "demo-thread");
    for question in ["How big is the EV market?", "Any update?"] {
        let state = pipeline
            .invoke(StateUpdate::new().with_message(Message::user(question)), &run)
            .await?;
        if let Some(last) = state.last_message() {
            println!("Q: {question}\nA: {}", last.content);
        }
        println!("loaded skills so far: {:?}\n", state.loaded_skills);
    }
    Ok(())
}
