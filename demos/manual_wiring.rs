//! # Manual Wiring
//!
//! Builds two agent steps from node documents and wires them by hand around
//! one shared tool node. Tool results are routed back to whichever step
//! issued the call through `sender`.
//!
//! ```bash
//! cargo run --example manual_wiring
//! ```

mod demo_tools;

use demo_tools::{demo_dir, demo_tools};
use serde_json::json;
use skillgate::agent::graph::TOOLS_NODE;
use skillgate::testing::ScriptedModel;
use skillgate::{
    AgentState, END, LoggingConfig, Message, RunConfig, SkillGateway, StateGraph, StateUpdate,
    ToolNode, ToolRegistry, create_agent, route_to_sender, tools_condition,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    skillgate::init_logging(&LoggingConfig::default());

    let dir = demo_dir();
    let registry = Arc::new(ToolRegistry::from_tools(demo_tools()));
    let gateway = Arc::new(SkillGateway::new([dir.join("skills")], registry.clone()));

    let researcher = create_agent(
        dir.join("nodes/researcher.md"),
        &gateway,
        ScriptedModel::new()
            .then_call_tool("web_search", json!({"query": "EV sales"}))
            .then_reply("14 million EVs were sold last year.")
            .into_model(),
        Vec::new(),
    )?;
    let analyst = create_agent(
        dir.join("nodes/analyst.md"),
        &gateway,
        ScriptedModel::new()
            .then_call_tool("calculate", json!({"numbers": [14, 1.2]}))
            .then_reply("Including hybrids, about 15.2 million.")
            .into_model(),
        Vec::new(),
    )?;
    println!("researcher binds {:?}", researcher.tool_names());
    println!("analyst binds {:?}", analyst.tool_names());

    let mut shared_tools = registry.all();
    shared_tools.extend(gateway.tools());

    let mut graph = StateGraph::new();
    graph.add_node("researcher", Arc::new(researcher))?;
    graph.add_node("analyst", Arc::new(analyst))?;
    graph.add_node(TOOLS_NODE, Arc::new(ToolNode::new(shared_tools)))?;
    graph
        .set_entry_point("researcher")
        .add_conditional_edges(
            "researcher",
            |state: &AgentState| match tools_condition(state).as_str() {
                TOOLS_NODE => TOOLS_NODE.to_string(),
                _ => "analyst".to_string(),
            },
            &[TOOLS_NODE, "analyst"],
        )
        .add_conditional_edges("analyst", tools_condition, &[TOOLS_NODE, END])
        .add_conditional_edges(TOOLS_NODE, route_to_sender, &["researcher", "analyst"]);

    let state = graph
        .compile()?
        .invoke(
            StateUpdate::new().with_message(Message::user("Size the EV market")),
            &RunConfig::default(),
        )
        .await?;

    for message in &state.messages {
        let author = message.name.as_deref().unwrap_or("-");
        println!("[{} / {author}] {}", message.role, message.content);
    }
    Ok(())
}
