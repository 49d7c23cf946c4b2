use async_trait::async_trait;
use serde_json::Value;
use skillgate_core::error::{ModelError, ModelResult};
use skillgate_core::message::{Message, ToolCallRequest};
use skillgate_core::model::{ChatModel, ModelRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// A chat model that replays queued responses in order.
///
/// Every request is recorded with its messages and bound tools, so tests can
/// assert on what the model was shown at each turn. Once the script runs out
/// the model answers with [`ModelError::InvalidResponse`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedModel {
    script: Arc<Mutex<VecDeque<ModelResult<Message>>>>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a final text answer.
    pub fn then_reply(self, content: impl Into<String>) -> Self {
        self.then_message(Message::assistant(content))
    }

    /// Queue a single tool call.
    pub fn then_call_tool(self, name: impl Into<String>, arguments: Value) -> Self {
        self.then_call_tools(vec![ToolCallRequest::new(name, arguments)])
    }

    /// Queue one assistant message requesting several tool calls.
    pub fn then_call_tools(self, calls: Vec<ToolCallRequest>) -> Self {
        self.then_message(Message::assistant_with_tool_calls("", calls))
    }

    pub fn then_message(self, message: Message) -> Self {
        lock(&self.script).push_back(Ok(message));
        self
    }

    /// Queue an invocation failure.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        lock(&self.script).push_back(Err(ModelError::invocation(message)));
        self
    }

    pub fn into_model(self) -> Arc<dyn ChatModel> {
        Arc::new(self)
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn last_request(&self) -> Option<ModelRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Tool names bound on each recorded request, in call order.
    pub fn bound_tool_names(&self) -> Vec<Vec<String>> {
        lock(&self.requests)
            .iter()
            .map(|request| request.tools.iter().map(|spec| spec.name.clone()).collect())
            .collect()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, request: ModelRequest) -> ModelResult<Message> {
        lock(&self.requests).push(request);
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| {
                Err(ModelError::InvalidResponse {
                    message: "script exhausted".to_string(),
                })
            })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
