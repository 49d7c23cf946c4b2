use skillgate_core::message::ToolCallRequest;
use skillgate_core::tool::{ExecutionResult, FailureReason, Tool, ToolSpec};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Tools keyed by name.
///
/// Registering a name twice replaces the earlier tool in place, so listing
/// order stays the order in which names were first registered. Lookups never
/// fail loudly: [`resolve`](Self::resolve) drops names it does not know,
/// leaving strict checking to the configuration validator.
///
/// # Example
///
/// ```rust
/// use skillgate_tools::ToolRegistry;
/// use skillgate_core::tool::{ExecutionResult, Tool};
/// use std::sync::Arc;
///
/// struct Echo;
///
/// impl Tool for Echo {
///     fn name(&self) -> &str { "echo" }
///     fn call(&self, arguments: serde_json::Value) -> ExecutionResult {
///         ExecutionResult::success(arguments.to_string())
///     }
/// }
///
/// let registry = ToolRegistry::new().with_tool(Arc::new(Echo));
/// assert!(registry.contains("echo"));
/// assert!(registry.resolve(["echo", "missing"]).len() == 1);
/// ```
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of tools.
    pub fn from_tools<I>(tools: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut registry = Self::new();
        registry.register(tools);
        registry
    }

    /// Builder-style registration of a single tool.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register_tool(tool);
        self
    }

    /// Register one or more tools. A later tool with the same name wins.
    pub fn register<I>(&mut self, tools: I)
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        for tool in tools {
            self.register_tool(tool);
        }
    }

    pub fn register_tool(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        match self.index.get(&name) {
            Some(&slot) => {
                tracing::debug!(tool = %name, "Replacing registered tool");
                self.tools[slot] = tool;
            }
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&slot| Arc::clone(&self.tools[slot]))
    }

    /// Tools for the given names, in the order requested. Unknown names are skipped.
    pub fn resolve<I, S>(&self, names: I) -> Vec<Arc<dyn Tool>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| self.lookup(name.as_ref()))
            .collect()
    }

    /// Every tool, in first-registration order.
    pub fn all(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.clone()
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.index.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Specs of every tool, for binding to a model.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|tool| ToolSpec::from_tool(tool.as_ref()))
            .collect()
    }

    /// Run the tool a call names. `None` when no such tool is registered.
    pub fn dispatch(&self, call: &ToolCallRequest) -> Option<ExecutionResult> {
        let tool = self.lookup(&call.name)?;
        tracing::debug!(tool = %call.name, call_id = %call.id, "Dispatching tool call");
        Some(tool.call(call.arguments.clone()))
    }

    /// Like [`dispatch`](Self::dispatch), reporting unknown tools as a failure result.
    pub fn try_dispatch(&self, call: &ToolCallRequest) -> ExecutionResult {
        self.dispatch(call).unwrap_or_else(|| {
            ExecutionResult::failed(FailureReason::NotFound {
                message: format!(
                    "Tool '{}' is not available. Available tools: {}",
                    call.name,
                    self.tools
                        .iter()
                        .map(|tool| tool.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
        })
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field(
                "tools",
                &self.tools.iter().map(|tool| tool.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
