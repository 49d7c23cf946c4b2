//! Chat model contract.
//!
//! The model is an opaque capability: it receives the conversation and the
//! specs of the tools it may call, and answers with one assistant message
//! that is either final text or a set of tool-call requests.

use crate::error::ModelResult;
use crate::message::Message;
use crate::tool::ToolSpec;
use async_trait::async_trait;
use std::sync::Arc;

/// Input for one model turn.
#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    pub messages: Vec<Message>,
    /// Tools bound for this turn. Empty means plain text responses only.
    pub tools: Vec<ToolSpec>,
}

impl ModelRequest {
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|spec| spec.name.as_str()).collect()
    }
}

/// A language model that may request tool calls.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Identifier used in logs.
    fn model_name(&self) -> &str {
        "chat-model"
    }

    async fn invoke(&self, request: ModelRequest) -> ModelResult<Message>;
}

/// A model paired with a fixed set of tool specs.
#[derive(Clone)]
pub struct BoundModel {
    model: Arc<dyn ChatModel>,
    tools: Vec<ToolSpec>,
}

impl BoundModel {
    pub fn new(model: Arc<dyn ChatModel>, tools: Vec<ToolSpec>) -> Self {
        Self { model, tools }
    }

    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    pub async fn invoke(&self, messages: Vec<Message>) -> ModelResult<Message> {
        self.model
            .invoke(ModelRequest {
                messages,
                tools: self.tools.clone(),
            })
            .await
    }
}

impl std::fmt::Debug for BoundModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundModel")
            .field("model", &self.model.model_name())
            .field("tools", &self.tools.len())
            .finish()
    }
}

/// Bind tool specs to a model.
pub fn bind_tools(model: Arc<dyn ChatModel>, tools: Vec<ToolSpec>) -> BoundModel {
    BoundModel::new(model, tools)
}
