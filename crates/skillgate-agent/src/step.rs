//! Agent steps: one model call with a skill-scoped tool set.
//!
//! A step owns its full tool list (static tools, gateway tools, extras) but
//! only binds the subset the conversation currently allows:
//!
//! | `available_tools` in state | Tools bound to the model        |
//! |----------------------------|---------------------------------|
//! | empty                      | the full list                   |
//! | non-empty                  | full list filtered to the set   |
//!
//! The system prompt always comes first in the messages sent to the model.

use crate::catalog::node_skill_catalog;
use crate::error::{AgentError, AgentResult, GraphResult};
use crate::gateway::SkillGateway;
use crate::graph::{END, GraphNode, RunConfig, START};
use crate::validate::validate_node_config_in;
use async_trait::async_trait;
use skillgate_core::config::SkillgateConfig;
use skillgate_core::error::ModelResult;
use skillgate_core::message::Message;
use skillgate_core::model::{BoundModel, ChatModel, bind_tools};
use skillgate_core::node::NodeConfig;
use skillgate_core::state::{AgentState, StateUpdate};
use skillgate_core::tool::{Tool, ToolSpec};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// A reasoning step bound to a model and a tool list.
#[derive(Clone)]
pub struct AgentStep {
    name: String,
    description: String,
    system_prompt: String,
    config: Option<NodeConfig>,
    model: Arc<dyn ChatModel>,
    tools: Vec<Arc<dyn Tool>>,
}

impl AgentStep {
    /// Step over `tools`, followed by the gateway's tools when one is given.
    pub fn new(
        name: impl Into<String>,
        model: Arc<dyn ChatModel>,
        mut tools: Vec<Arc<dyn Tool>>,
        gateway: Option<&Arc<SkillGateway>>,
    ) -> Self {
        if let Some(gateway) = gateway {
            tools.extend(gateway.tools());
        }
        Self {
            name: name.into(),
            description: String::new(),
            system_prompt: String::new(),
            config: None,
            model,
            tools,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// The node config the step was built from, if any.
    pub fn config(&self) -> Option<&NodeConfig> {
        self.config.as_ref()
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Names of every tool the step can ever bind.
    pub fn tool_names(&self) -> BTreeSet<String> {
        self.tools.iter().map(|tool| tool.name().to_string()).collect()
    }

    /// Tools allowed by the conversation's current `available_tools`.
    pub fn active_tools(&self, state: &AgentState) -> Vec<Arc<dyn Tool>> {
        if !state.is_restricted() {
            return self.tools.clone();
        }
        self.tools
            .iter()
            .filter(|tool| state.available_tools.contains(tool.name()))
            .cloned()
            .collect()
    }

    /// The model bound to the active tool subset.
    pub fn bind(&self, state: &AgentState) -> BoundModel {
        let specs: Vec<ToolSpec> = self
            .active_tools(state)
            .iter()
            .map(|tool| ToolSpec::from_tool(tool.as_ref()))
            .collect();
        debug!(step = %self.name, tools = specs.len(), "Binding active tools");
        bind_tools(self.model.clone(), specs)
    }

    /// Conversation history behind the system message, which always comes
    /// first, even when the prompt is empty.
    pub fn prompt_messages(&self, state: &AgentState) -> Vec<Message> {
        let mut messages = Vec::with_capacity(state.messages.len() + 1);
        messages.push(Message::system(self.system_prompt.clone()));
        messages.extend(state.messages.iter().cloned());
        messages
    }

    /// Run one model turn. Model failures are returned unchanged.
    pub async fn invoke(&self, state: &AgentState) -> ModelResult<StateUpdate> {
        let response = self.bind(state).invoke(self.prompt_messages(state)).await?;
        Ok(StateUpdate::new()
            .with_message(response.with_name(self.name.clone()))
            .with_sender(self.name.clone()))
    }
}

#[async_trait]
impl GraphNode for AgentStep {
    async fn run(&self, state: &AgentState, _config: &RunConfig) -> GraphResult<StateUpdate> {
        Ok(self.invoke(state).await?)
    }
}

impl std::fmt::Debug for AgentStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentStep")
            .field("name", &self.name)
            .field("model", &self.model.model_name())
            .field("tools", &self.tool_names())
            .finish()
    }
}

/// Build a step from a node config document.
///
/// The config is validated against the gateway's registry and skill roots
/// first; every violation is reported at once. Tools bound, in order: the
/// node's `allowed-tools` (or the whole registry when none are declared),
/// the gateway tools, then `extra_tools`.
pub fn create_agent(
    config_path: impl AsRef<Path>,
    gateway: &Arc<SkillGateway>,
    model: Arc<dyn ChatModel>,
    extra_tools: Vec<Arc<dyn Tool>>,
) -> AgentResult<AgentStep> {
    let config = NodeConfig::from_file(config_path)?;
    build_step(config, gateway, model, extra_tools, true)
}

/// Build the step for node `node_name` using the configured node directory
/// and catalog setting.
pub fn create_agent_from_config(
    settings: &SkillgateConfig,
    node_name: &str,
    gateway: &Arc<SkillGateway>,
    model: Arc<dyn ChatModel>,
    extra_tools: Vec<Arc<dyn Tool>>,
) -> AgentResult<AgentStep> {
    check_node_name(node_name)?;
    let config = NodeConfig::from_file(settings.node_config_path(node_name))?;
    build_step(
        config,
        gateway,
        model,
        extra_tools,
        settings.agent.append_skill_catalog,
    )
}

fn build_step(
    config: NodeConfig,
    gateway: &Arc<SkillGateway>,
    model: Arc<dyn ChatModel>,
    extra_tools: Vec<Arc<dyn Tool>>,
    append_catalog: bool,
) -> AgentResult<AgentStep> {
    check_node_name(&config.name)?;

    let registry = gateway.registry();
    let errors = validate_node_config_in(&config, registry, gateway.roots());
    if !errors.is_empty() {
        return Err(AgentError::InvalidNodeConfig {
            node: config.name,
            errors,
        });
    }

    let mut system_prompt = config.system_prompt.clone();
    if append_catalog
        && let Some(catalog) = node_skill_catalog(&config.skills, gateway.roots())
    {
        system_prompt = format!("{system_prompt}\n\n{catalog}");
    }

    let tools = if config.has_allowed_tools() {
        registry.resolve(&config.allowed_tools)
    } else {
        registry.all()
    };
    let mut step = AgentStep::new(config.name.clone(), model, tools, Some(gateway))
        .with_system_prompt(system_prompt)
        .with_description(config.description.clone());
    step.tools.extend(extra_tools);

    info!(node = %config.name, tools = step.tools.len(), skills = config.skills.len(), "Agent step built");
    step.config = Some(config);
    Ok(step)
}

fn check_node_name(name: &str) -> AgentResult<()> {
    let reason = if name.trim().is_empty() {
        "name is empty"
    } else if name == END || name == START {
        "name is reserved by the graph"
    } else {
        return Ok(());
    };
    Err(AgentError::InvalidNodeName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillgate_core::message::MessageRole;
    use skillgate_testing::{MockTool, ScriptedModel, SkillRootFixture};
    use skillgate_tools::ToolRegistry;

    fn registry() -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::from_tools([
            MockTool::new("sql_query").into_tool(),
            MockTool::new("calculate").into_tool(),
            MockTool::new("web_search").into_tool(),
        ]))
    }

    fn gateway(fixture: &SkillRootFixture) -> Arc<SkillGateway> {
        Arc::new(SkillGateway::new([fixture.root()], registry()))
    }

    #[tokio::test]
    async fn system_prompt_leads_every_turn() {
        let model = ScriptedModel::new().then_reply("first").then_reply("second");
        let step = AgentStep::new("writer", model.clone().into_model(), Vec::new(), None)
            .with_system_prompt("You write.");

        let mut state = AgentState::from_user("hello");
        let update = step.invoke(&state).await.unwrap();
        assert_eq!(update.sender.as_deref(), Some("writer"));
        assert_eq!(update.messages[0].name.as_deref(), Some("writer"));
        state.messages.extend(update.messages);
        state.messages.push(Message::user("again"));
        step.invoke(&state).await.unwrap();

        for request in model.requests() {
            assert_eq!(request.messages[0].content, "You write.");
        }
        assert_eq!(model.last_request().unwrap().messages.len(), 4);
        assert!(model.last_request().unwrap().tools.is_empty());
    }

    #[tokio::test]
    async fn empty_prompt_still_sends_a_system_message() {
        let model = ScriptedModel::new().then_reply("ok");
        let step = AgentStep::new("plain", model.clone().into_model(), Vec::new(), None);

        step.invoke(&AgentState::from_user("hello")).await.unwrap();
        let request = model.last_request().unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(request.messages[0].content, "");
        assert_eq!(request.messages[1].content, "hello");
    }

    #[tokio::test]
    async fn available_tools_filter_the_bound_set() {
        let fixture = SkillRootFixture::new();
        let model = ScriptedModel::new().then_reply("a").then_reply("b");
        let step = AgentStep::new(
            "analyst",
            model.clone().into_model(),
            vec![
                MockTool::new("sql_query").into_tool(),
                MockTool::new("web_search").into_tool(),
            ],
            Some(&gateway(&fixture)),
        );

        step.invoke(&AgentState::from_user("q")).await.unwrap();
        let mut restricted = AgentState::from_user("q");
        restricted.available_tools = ["web_search", "load_skill"].map(String::from).into();
        step.invoke(&restricted).await.unwrap();

        let bound = model.bound_tool_names();
        assert_eq!(
            bound[0],
            vec!["sql_query", "web_search", "load_skill", "read_reference"]
        );
        assert_eq!(bound[1], vec!["web_search", "load_skill"]);
    }

    #[tokio::test]
    async fn model_failures_propagate() {
        let model = ScriptedModel::new().then_fail("rate limited");
        let step = AgentStep::new("a", model.into_model(), Vec::new(), None);
        let err = step.invoke(&AgentState::from_user("q")).await.unwrap_err();
        assert_eq!(err.to_string(), "Model invocation failed: rate limited");
    }

    #[test]
    fn create_agent_binds_allowed_then_gateway_then_extra_tools() {
        let fixture = SkillRootFixture::new();
        fixture.skill("market-sizing", "Size markets", &["web_search", "calculate"], "Steps");
        let path = fixture.node(
            "analyst",
            "Crunches numbers",
            &["market-sizing"],
            &["sql_query", "calculate"],
            "You are an analyst.",
        );

        let step = create_agent(
            &path,
            &gateway(&fixture),
            ScriptedModel::new().into_model(),
            vec![MockTool::new("notify").into_tool()],
        )
        .unwrap();

        let names: Vec<_> = step.tools().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(
            names,
            vec!["sql_query", "calculate", "load_skill", "read_reference", "notify"]
        );
        assert_eq!(step.name(), "analyst");
        assert_eq!(step.description(), "Crunches numbers");
        assert!(step.system_prompt().starts_with("You are an analyst."));
        assert!(step.system_prompt().contains("## Available Skills"));
        assert!(step.system_prompt().contains("| market-sizing | Size markets |"));
        assert_eq!(step.config().unwrap().skills, vec!["market-sizing"]);
    }

    #[test]
    fn create_agent_without_allowed_tools_binds_whole_registry() {
        let fixture = SkillRootFixture::new();
        let path = fixture.node("generalist", "Does it all", &[], &[], "Help.");
        let step = create_agent(
            &path,
            &gateway(&fixture),
            ScriptedModel::new().into_model(),
            Vec::new(),
        )
        .unwrap();

        assert_eq!(step.tool_names().len(), 5);
        assert_eq!(step.system_prompt(), "Help.");
    }

    #[test]
    fn create_agent_reports_every_violation() {
        let fixture = SkillRootFixture::new();
        let path = fixture.node(
            "broken",
            "Misconfigured",
            &["stakeholder-mapping"],
            &["teleport", "fly"],
            "",
        );

        let err = create_agent(
            &path,
            &gateway(&fixture),
            ScriptedModel::new().into_model(),
            Vec::new(),
        )
        .unwrap_err();
        match err {
            AgentError::InvalidNodeConfig { node, errors } => {
                assert_eq!(node, "broken");
                assert_eq!(errors.len(), 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn create_agent_from_config_honours_catalog_setting() {
        let fixture = SkillRootFixture::new();
        fixture.skill("pdf", "Work with PDFs", &[], "Steps");
        fixture.node("reader", "Reads", &["pdf"], &[], "Read things.");

        let mut settings = SkillgateConfig::default().with_base_dir(fixture.path());
        settings.agent.append_skill_catalog = false;
        let gateway = Arc::new(SkillGateway::from_config(&settings, registry()));

        let step = create_agent_from_config(
            &settings,
            "reader",
            &gateway,
            ScriptedModel::new().into_model(),
            Vec::new(),
        )
        .unwrap();
        assert_eq!(step.system_prompt(), "Read things.");

        let err = create_agent_from_config(
            &settings,
            END,
            &gateway,
            ScriptedModel::new().into_model(),
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_NODE_NAME");
    }

    #[test]
    fn missing_document_is_fatal() {
        let fixture = SkillRootFixture::new();
        let err = create_agent(
            fixture.path().join("nodes/ghost.md"),
            &gateway(&fixture),
            ScriptedModel::new().into_model(),
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, AgentError::NodeConfig(_)));
    }
}
