//! Builder for self-contained reason-act agents.
//!
//! ```rust,ignore
//! let agent = ReactAgentBuilder::new("researcher")
//!     .model(model)
//!     .tools(vec![web_search, calculate])
//!     .skills(SkillSource::root("skills"))
//!     .build()?;
//!
//! let state = agent.invoke(StateUpdate::new().with_message(Message::user("hi")), &RunConfig::default()).await?;
//! ```
//!
//! The result is a [`CompiledGraph`]: usable on its own or as a node inside a
//! larger graph.

use crate::error::{AgentError, AgentResult, GraphResult};
use crate::gateway::SkillGateway;
use crate::graph::{
    Checkpointer, CompiledGraph, END, GraphNode, RunConfig, START, StateGraph, TOOLS_NODE,
    ToolNode, tools_condition,
};
use crate::step::AgentStep;
use async_trait::async_trait;
use skillgate_core::model::{BoundModel, ChatModel};
use skillgate_core::state::{AgentState, StateUpdate};
use skillgate_core::tool::Tool;
use skillgate_tools::ToolRegistry;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Where an agent finds its skills.
#[derive(Debug, Clone)]
pub enum SkillSource {
    /// Skill roots in priority order. Skills may unlock the agent's own tools.
    Roots(Vec<PathBuf>),
    /// A gateway shared with other agents.
    Gateway(Arc<SkillGateway>),
}

impl SkillSource {
    pub fn root(path: impl Into<PathBuf>) -> Self {
        Self::Roots(vec![path.into()])
    }
}

/// What a handler asks to receive alongside the state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// The model bound to the currently active tools
    pub model: bool,
    /// The currently active tools
    pub tools: bool,
    /// The run configuration of the current invocation
    pub runtime: bool,
}

impl Capabilities {
    pub const NONE: Self = Self {
        model: false,
        tools: false,
        runtime: false,
    };

    pub const ALL: Self = Self {
        model: true,
        tools: true,
        runtime: true,
    };

    pub fn with_model(mut self) -> Self {
        self.model = true;
        self
    }

    pub fn with_tools(mut self) -> Self {
        self.tools = true;
        self
    }

    pub fn with_runtime(mut self) -> Self {
        self.runtime = true;
        self
    }
}

/// Collaborators handed to a handler. Only requested capabilities are set.
#[derive(Clone)]
pub struct HandlerContext {
    name: String,
    model: Option<BoundModel>,
    tools: Option<Vec<Arc<dyn Tool>>>,
    runtime: Option<RunConfig>,
}

impl HandlerContext {
    /// Name of the agent running the handler.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> Option<&BoundModel> {
        self.model.as_ref()
    }

    pub fn tools(&self) -> Option<&[Arc<dyn Tool>]> {
        self.tools.as_deref()
    }

    pub fn runtime(&self) -> Option<&RunConfig> {
        self.runtime.as_ref()
    }
}

/// Custom body of an agent's reasoning step.
#[async_trait]
pub trait AgentHandler: Send + Sync {
    async fn handle(&self, state: AgentState, context: HandlerContext) -> GraphResult<StateUpdate>;
}

#[async_trait]
impl<F, Fut> AgentHandler for F
where
    F: Fn(AgentState, HandlerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = GraphResult<StateUpdate>> + Send + 'static,
{
    async fn handle(&self, state: AgentState, context: HandlerContext) -> GraphResult<StateUpdate> {
        self(state, context).await
    }
}

struct HandlerNode {
    step: AgentStep,
    handler: Arc<dyn AgentHandler>,
    capabilities: Capabilities,
}

#[async_trait]
impl GraphNode for HandlerNode {
    async fn run(&self, state: &AgentState, config: &RunConfig) -> GraphResult<StateUpdate> {
        let context = HandlerContext {
            name: self.step.name().to_string(),
            model: self.capabilities.model.then(|| self.step.bind(state)),
            tools: self
                .capabilities
                .tools
                .then(|| self.step.active_tools(state)),
            runtime: self.capabilities.runtime.then(|| config.clone()),
        };
        self.handler.handle(state.clone(), context).await
    }
}

/// Assembles an `agent ⇄ tools` graph.
pub struct ReactAgentBuilder {
    name: String,
    model: Option<Arc<dyn ChatModel>>,
    tools: Vec<Arc<dyn Tool>>,
    skills: Option<SkillSource>,
    handler: Option<(Capabilities, Arc<dyn AgentHandler>)>,
    system_prompt: Option<String>,
    checkpointer: Option<Arc<dyn Checkpointer>>,
}

impl ReactAgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: None,
            tools: Vec::new(),
            skills: None,
            handler: None,
            system_prompt: None,
            checkpointer: None,
        }
    }

    pub fn model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn skills(mut self, source: SkillSource) -> Self {
        self.skills = Some(source);
        self
    }

    /// Replace the default step body. Without a handler the agent calls the
    /// model on the conversation and records itself as `sender`.
    pub fn handler<H>(mut self, capabilities: Capabilities, handler: H) -> Self
    where
        H: AgentHandler + 'static,
    {
        self.handler = Some((capabilities, Arc::new(handler)));
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn checkpointer(mut self, checkpointer: Arc<dyn Checkpointer>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    pub fn build(self) -> AgentResult<CompiledGraph> {
        if self.name.trim().is_empty() || [END, START, TOOLS_NODE].contains(&self.name.as_str()) {
            return Err(AgentError::InvalidNodeName {
                reason: "agent name must be non-empty and not a reserved node name".to_string(),
                name: self.name,
            });
        }
        let model = self.model.ok_or_else(|| AgentError::MissingModel {
            node: self.name.clone(),
        })?;

        let gateway = match self.skills {
            Some(SkillSource::Gateway(gateway)) => Some(gateway),
            Some(SkillSource::Roots(roots)) => {
                let registry = Arc::new(ToolRegistry::from_tools(self.tools.iter().cloned()));
                Some(Arc::new(SkillGateway::new(roots, registry)))
            }
            None => None,
        };

        let mut step = AgentStep::new(self.name.clone(), model, self.tools, gateway.as_ref());
        if let Some(prompt) = self.system_prompt {
            step = step.with_system_prompt(prompt);
        }
        let tools = step.tools().to_vec();

        let agent: Arc<dyn GraphNode> = match self.handler {
            Some((capabilities, handler)) => Arc::new(HandlerNode {
                step,
                handler,
                capabilities,
            }),
            None => Arc::new(step),
        };

        let mut graph = StateGraph::new();
        graph.add_node(self.name.clone(), agent)?;
        graph.set_entry_point(self.name.clone());

        if tools.is_empty() {
            graph.set_finish_point(self.name.clone());
        } else {
            graph.add_node(TOOLS_NODE, Arc::new(ToolNode::new(tools.iter().cloned())))?;
            graph
                .add_conditional_edges(self.name.clone(), tools_condition, &[TOOLS_NODE, END])
                .add_edge(TOOLS_NODE, self.name.clone());
        }

        let compiled = match self.checkpointer {
            Some(checkpointer) => graph.compile_with_checkpointer(checkpointer)?,
            None => graph.compile()?,
        };
        info!(agent = %self.name, tools = tools.len(), skills = gateway.is_some(), "Agent graph built");
        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::graph::InMemoryCheckpointer;
    use serde_json::json;
    use skillgate_core::message::{Message, MessageRole};
    use skillgate_testing::{MockTool, ScriptedModel, SkillRootFixture};

    fn user(text: &str) -> StateUpdate {
        StateUpdate::new().with_message(Message::user(text))
    }

    #[test]
    fn model_is_required() {
        let err = ReactAgentBuilder::new("researcher").build().unwrap_err();
        assert!(matches!(err, AgentError::MissingModel { node } if node == "researcher"));
    }

    #[test]
    fn reserved_names_are_rejected() {
        let err = ReactAgentBuilder::new(TOOLS_NODE)
            .model(ScriptedModel::new().into_model())
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_NODE_NAME");
    }

    #[tokio::test]
    async fn without_tools_the_agent_answers_once() {
        let model = ScriptedModel::new().then_reply("hello back");
        let agent = ReactAgentBuilder::new("greeter")
            .model(model.clone().into_model())
            .build()
            .unwrap();
        assert_eq!(agent.node_names(), vec!["greeter"]);

        let state = agent.invoke(user("hello"), &RunConfig::default()).await.unwrap();
        assert_eq!(state.messages.last().unwrap().content, "hello back");
        assert_eq!(state.sender.as_deref(), Some("greeter"));
        assert_eq!(model.request_count(), 1);
    }

    #[tokio::test]
    async fn loop_runs_tools_until_final_answer() {
        let search = MockTool::new("web_search").with_response("42 results");
        let model = ScriptedModel::new()
            .then_call_tool("web_search", json!({"query": "rust"}))
            .then_reply("done");
        let agent = ReactAgentBuilder::new("researcher")
            .model(model.clone().into_model())
            .tool(search.clone().into_tool())
            .build()
            .unwrap();

        let state = agent.invoke(user("search"), &RunConfig::default()).await.unwrap();
        let contents: Vec<_> = state.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["search", "", "42 results", "done"]);
        assert!(search.was_called_with(&json!({"query": "rust"})));
    }

    #[tokio::test]
    async fn loading_a_skill_narrows_the_next_turn() {
        let fixture = SkillRootFixture::new();
        fixture.skill("pdf", "Work with PDFs", &["extract_text"], "Use extract_text.");

        let model = ScriptedModel::new()
            .then_call_tool("load_skill", json!({"skill_name": "pdf"}))
            .then_call_tool("extract_text", json!({}))
            .then_reply("summary");
        let agent = ReactAgentBuilder::new("reader")
            .model(model.clone().into_model())
            .tools(vec![
                MockTool::new("extract_text").into_tool(),
                MockTool::new("web_search").into_tool(),
            ])
            .skills(SkillSource::root(fixture.root()))
            .build()
            .unwrap();

        let state = agent.invoke(user("read it"), &RunConfig::default()).await.unwrap();

        let bound = model.bound_tool_names();
        assert_eq!(
            bound[0],
            vec!["extract_text", "web_search", "load_skill", "read_reference"]
        );
        assert_eq!(bound[1], vec!["extract_text", "load_skill", "read_reference"]);
        assert_eq!(state.loaded_skills, vec!["pdf"]);
        assert!(!state.available_tools.contains("web_search"));
        assert!(state.messages.iter().any(|m| m.content == "Use extract_text."));
    }

    #[tokio::test]
    async fn handler_receives_requested_capabilities() {
        let model = ScriptedModel::new().then_reply("from handler");
        let agent = ReactAgentBuilder::new("custom")
            .model(model.clone().into_model())
            .tool(MockTool::new("calculate").into_tool())
            .handler(
                Capabilities::NONE.with_model().with_runtime(),
                |state: AgentState, context: HandlerContext| async move {
                    assert!(context.tools().is_none());
                    let thread = context.runtime().map(|r| r.thread_id.clone());
                    let bound = context.model().cloned().ok_or_else(|| GraphError::Node {
                        node: "custom".into(),
                        message: "no model".into(),
                    })?;
                    let reply = bound.invoke(state.messages).await?;
                    Ok::<_, GraphError>(
                        StateUpdate::new()
                            .with_message(reply)
                            .with_sender(context.name())
                            .with_extra("thread", json!(thread)),
                    )
                },
            )
            .build()
            .unwrap();

        let state = agent
            .invoke(user("hi"), &RunConfig::new("t-1"))
            .await
            .unwrap();
        assert_eq!(state.messages.last().unwrap().content, "from handler");
        assert_eq!(state.extra["thread"], json!("t-1"));
        assert_eq!(model.bound_tool_names()[0], vec!["calculate"]);
    }

    #[tokio::test]
    async fn checkpointer_keeps_the_thread() {
        let checkpointer = Arc::new(InMemoryCheckpointer::new());
        let model = ScriptedModel::new().then_reply("one").then_reply("two");
        let agent = ReactAgentBuilder::new("chat")
            .model(model.clone().into_model())
            .checkpointer(checkpointer.clone())
            .build()
            .unwrap();

        let config = RunConfig::new("thread");
        agent.invoke(user("a"), &config).await.unwrap();
        let state = agent.invoke(user("b"), &config).await.unwrap();
        assert_eq!(state.messages.len(), 4);
        let request = model.last_request().unwrap();
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(checkpointer.thread_ids(), vec!["thread"]);
    }
}
