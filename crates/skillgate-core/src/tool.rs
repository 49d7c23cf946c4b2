//! The tool abstraction shared by the registry, the gateway and the steps.

use crate::state::StateUpdate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// Categorized failure reasons for tool execution.
///
/// Failures are shown to the model as tool-result text so it can correct
/// itself; they never abort the enclosing step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureReason {
    /// Invalid or malformed input provided to the tool
    InvalidInput { message: String },
    /// Required resource not found (skill, file, tool)
    NotFound { message: String },
    /// Access outside the permitted sandbox
    PermissionDenied { message: String },
    /// I/O operation failed
    IoError { message: String },
    /// Internal tool error or unexpected state
    InternalError { message: String },
}

impl FailureReason {
    /// The message without a category prefix.
    pub fn message(&self) -> &str {
        match self {
            FailureReason::InvalidInput { message }
            | FailureReason::NotFound { message }
            | FailureReason::PermissionDenied { message }
            | FailureReason::IoError { message }
            | FailureReason::InternalError { message } => message,
        }
    }

    /// Stable category name, matching the serialized tag.
    pub fn category(&self) -> &'static str {
        match self {
            FailureReason::InvalidInput { .. } => "invalid_input",
            FailureReason::NotFound { .. } => "not_found",
            FailureReason::PermissionDenied { .. } => "permission_denied",
            FailureReason::IoError { .. } => "io_error",
            FailureReason::InternalError { .. } => "internal_error",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error: {}", self.message())
    }
}

/// The result of executing a tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// Tool executed successfully with the given output.
    Success { output: String },

    /// Tool succeeded and also asks for a state change, e.g. widening the
    /// available tool set after a skill load.
    Command { output: String, update: StateUpdate },

    /// Tool execution failed with a structured reason.
    Failure { reason: FailureReason },
}

impl ExecutionResult {
    pub fn success(output: impl Into<String>) -> Self {
        ExecutionResult::Success {
            output: output.into(),
        }
    }

    pub fn command(output: impl Into<String>, update: StateUpdate) -> Self {
        ExecutionResult::Command {
            output: output.into(),
            update,
        }
    }

    pub fn failed(reason: FailureReason) -> Self {
        ExecutionResult::Failure { reason }
    }

    /// Failure from a plain message, categorized as an internal error.
    pub fn failure(message: impl Into<String>) -> Self {
        ExecutionResult::Failure {
            reason: FailureReason::InternalError {
                message: message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        !self.is_failure()
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionResult::Failure { .. })
    }

    /// Text shown to the model: the output on success, the error otherwise.
    pub fn output(&self) -> String {
        match self {
            ExecutionResult::Success { output } | ExecutionResult::Command { output, .. } => {
                output.clone()
            }
            ExecutionResult::Failure { reason } => reason.to_string(),
        }
    }

    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            ExecutionResult::Failure { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn state_update(&self) -> Option<&StateUpdate> {
        match self {
            ExecutionResult::Command { update, .. } => Some(update),
            _ => None,
        }
    }

    /// Split into model-visible text and an optional state update.
    pub fn into_parts(self) -> (String, Option<StateUpdate>) {
        match self {
            ExecutionResult::Success { output } => (output, None),
            ExecutionResult::Command { output, update } => (output, Some(update)),
            ExecutionResult::Failure { reason } => (reason.to_string(), None),
        }
    }
}

/// A capability the model can invoke.
///
/// # Example
///
/// ```rust
/// use skillgate_core::tool::{ExecutionResult, FailureReason, Tool};
/// use serde_json::Value;
///
/// struct Doubler;
///
/// impl Tool for Doubler {
///     fn name(&self) -> &str {
///         "double"
///     }
///
///     fn call(&self, arguments: Value) -> ExecutionResult {
///         match arguments.get("value").and_then(Value::as_f64) {
///             Some(n) => ExecutionResult::success((n * 2.0).to_string()),
///             None => ExecutionResult::failed(FailureReason::InvalidInput {
///                 message: "expected a numeric 'value'".into(),
///             }),
///         }
///     }
/// }
/// ```
pub trait Tool: Send + Sync {
    /// Unique name used for registry lookup and model tool calls.
    fn name(&self) -> &str;

    /// Description shown to the model. May be computed on every call.
    fn description(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    /// JSON Schema of the arguments object. `None` means free-form.
    fn input_schema(&self) -> Option<Value> {
        None
    }

    fn call(&self, arguments: Value) -> ExecutionResult;
}

/// What a model needs to know to call a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolSpec {
    pub fn from_tool(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().into_owned(),
            parameters: tool
                .input_schema()
                .unwrap_or_else(|| serde_json::json!({ "type": "object" })),
        }
    }
}

/// Fetch a required string argument.
pub fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, FailureReason> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| FailureReason::InvalidInput {
            message: format!("Missing required string argument '{key}'"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> Cow<'_, str> {
            Cow::Borrowed("Echo the text argument")
        }

        fn call(&self, arguments: Value) -> ExecutionResult {
            match required_str(&arguments, "text") {
                Ok(text) => ExecutionResult::success(text),
                Err(reason) => ExecutionResult::failed(reason),
            }
        }
    }

    #[test]
    fn spec_defaults_to_object_schema() {
        let spec = ToolSpec::from_tool(&Echo);
        assert_eq!(spec.name, "echo");
        assert_eq!(spec.description, "Echo the text argument");
        assert_eq!(spec.parameters, json!({ "type": "object" }));
    }

    #[test]
    fn missing_argument_is_invalid_input() {
        let result = Echo.call(json!({}));
        assert!(result.is_failure());
        assert_eq!(
            result.output(),
            "Error: Missing required string argument 'text'"
        );
        assert_eq!(result.failure_reason().map(|r| r.category()), Some("invalid_input"));
    }

    #[test]
    fn command_carries_update() {
        let result =
            ExecutionResult::command("loaded", StateUpdate::new().with_loaded_skill("math"));
        assert!(result.is_success());
        assert!(result.state_update().is_some());

        let (text, update) = result.into_parts();
        assert_eq!(text, "loaded");
        assert_eq!(update.map(|u| u.loaded_skills), Some(vec!["math".to_string()]));
    }

    #[test]
    fn failure_reason_serializes_with_tag() {
        let value = serde_json::to_value(FailureReason::NotFound {
            message: "gone".into(),
        })
        .unwrap();
        assert_eq!(value["type"], "not_found");
    }
}
