use super::{GraphNode, RunConfig};
use crate::error::GraphResult;
use async_trait::async_trait;
use skillgate_core::message::{Message, ToolCallRequest};
use skillgate_core::state::{AgentState, StateUpdate};
use skillgate_core::tool::{ExecutionResult, FailureReason, Tool};
use skillgate_tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes the tool calls of the last assistant message.
///
/// Every call yields exactly one tool message answering its id. When the
/// state restricts `available_tools`, calls outside that set are answered
/// with an error instead of running. Command results also contribute their
/// state update.
pub struct ToolNode {
    registry: ToolRegistry,
}

impl ToolNode {
    pub fn new<I>(tools: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        Self {
            registry: ToolRegistry::from_tools(tools),
        }
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.registry.names().into_iter().collect()
    }

    /// Run a single call against `state`'s restriction.
    pub fn execute(&self, state: &AgentState, call: &ToolCallRequest) -> ExecutionResult {
        if state.is_restricted() && !state.available_tools.contains(&call.name) {
            warn!(tool = %call.name, "Tool call outside the available tool set");
            return ExecutionResult::failed(FailureReason::NotFound {
                message: format!(
                    "Tool '{}' is not available. Available tools: {}",
                    call.name,
                    state
                        .available_tools
                        .iter()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            });
        }
        self.registry.try_dispatch(call)
    }
}

#[async_trait]
impl GraphNode for ToolNode {
    async fn run(&self, state: &AgentState, _config: &RunConfig) -> GraphResult<StateUpdate> {
        let mut update = StateUpdate::new();
        let Some(last) = state.last_message() else {
            return Ok(update);
        };

        for call in &last.tool_calls {
            let result = self.execute(state, call);
            debug!(tool = %call.name, call_id = %call.id, success = result.is_success(), "Tool call finished");

            let message = match result {
                ExecutionResult::Failure { reason } => Message::tool_error(&call.id, reason.to_string()),
                other => {
                    let (output, command) = other.into_parts();
                    if let Some(command) = command {
                        update.merge(command);
                    }
                    Message::tool_result(&call.id, output)
                }
            };
            update.messages.push(message.with_name(&call.name));
        }
        Ok(update)
    }
}

impl std::fmt::Debug for ToolNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolNode")
            .field("tools", &self.tool_names())
            .finish()
    }
}
