use serde_json::Value;
use skillgate_core::tool::{ExecutionResult, Tool};
use std::borrow::Cow;
use std::sync::{Arc, Mutex, MutexGuard};

/// A tool that returns predefined responses and records its calls.
///
/// Clones share call history, so a test can keep one clone for inspection
/// and hand another to the code under test.
#[derive(Debug, Clone)]
pub struct MockTool {
    name: String,
    description: String,
    schema: Option<Value>,
    responses: Vec<(Value, ExecutionResult)>,
    default_response: Option<ExecutionResult>,
    call_history: Arc<Mutex<Vec<Value>>>,
}

impl MockTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            schema: None,
            responses: Vec::new(),
            default_response: None,
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Response for any arguments without a specific match
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = Some(ExecutionResult::success(response));
        self
    }

    /// Failure for any arguments without a specific match
    pub fn with_failure(mut self, error: impl Into<String>) -> Self {
        self.default_response = Some(ExecutionResult::failure(error));
        self
    }

    /// Response for one exact arguments value
    pub fn when(mut self, arguments: Value, response: impl Into<String>) -> Self {
        self.responses
            .push((arguments, ExecutionResult::success(response)));
        self
    }

    /// Any result, including a state-changing command, for one exact arguments value
    pub fn when_result(mut self, arguments: Value, result: ExecutionResult) -> Self {
        self.responses.push((arguments, result));
        self
    }

    pub fn into_tool(self) -> Arc<dyn Tool> {
        Arc::new(self)
    }

    pub fn call_count(&self) -> usize {
        self.history().len()
    }

    pub fn call_history(&self) -> Vec<Value> {
        self.history().clone()
    }

    pub fn was_called_with(&self, arguments: &Value) -> bool {
        self.history().contains(arguments)
    }

    pub fn reset(&self) {
        self.history().clear();
    }

    fn history(&self) -> MutexGuard<'_, Vec<Value>> {
        self.call_history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.description)
    }

    fn input_schema(&self) -> Option<Value> {
        self.schema.clone()
    }

    fn call(&self, arguments: Value) -> ExecutionResult {
        self.history().push(arguments.clone());

        if let Some((_, response)) = self.responses.iter().find(|(input, _)| *input == arguments) {
            response.clone()
        } else if let Some(default) = &self.default_response {
            default.clone()
        } else {
            ExecutionResult::success(format!("{} called with {}", self.name, arguments))
        }
    }
}
