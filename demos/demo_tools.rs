//! Small tools shared by the demos.

use serde_json::Value;
use skillgate::{ExecutionResult, FailureReason, Tool};
use std::borrow::Cow;
use std::sync::Arc;

/// Canned search results.
pub struct WebSearch;

impl Tool for WebSearch {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> Cow<'_, str> {
        Cow::Borrowed("Search the web for a query")
    }

    fn call(&self, arguments: Value) -> ExecutionResult {
        let query = arguments["query"].as_str().unwrap_or_default();
        ExecutionResult::success(format!("Top result for '{query}': 14 million EVs sold in 2023"))
    }
}

/// Adds the numbers it is given.
pub struct Calculate;

impl Tool for Calculate {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> Cow<'_, str> {
        Cow::Borrowed("Sum a list of numbers")
    }

    fn call(&self, arguments: Value) -> ExecutionResult {
        match arguments["numbers"].as_array() {
            Some(numbers) => {
                let total: f64 = numbers.iter().filter_map(Value::as_f64).sum();
                ExecutionResult::success(total.to_string())
            }
            None => ExecutionResult::failed(FailureReason::InvalidInput {
                message: "'numbers' must be an array".to_string(),
            }),
        }
    }
}

pub fn demo_tools() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(WebSearch), Arc::new(Calculate)]
}

pub fn demo_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos")
}
