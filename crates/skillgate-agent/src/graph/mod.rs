//! Minimal state-graph runtime.
//!
//! Just enough of a graph engine to run reason-act loops: named nodes,
//! direct and conditional edges, per-field state reducers, a recursion
//! limit, and per-thread checkpoints.
//!
//! ```text
//!            ┌───────────────┐
//!   entry ──▶│     agent     │──(no tool calls)──▶ END
//!            └──────┬────────┘
//!         tool calls│   ▲
//!                   ▼   │
//!            ┌──────────┴────┐
//!            │     tools     │
//!            └───────────────┘
//! ```

mod checkpoint;
mod compiled;
mod routing;
mod tool_node;

pub use checkpoint::{Checkpoint, Checkpointer, DEFAULT_MAX_HISTORY, InMemoryCheckpointer};
pub use compiled::{CompiledGraph, RunConfig};
pub use routing::{route_to_sender, tools_condition};
pub use tool_node::ToolNode;

use crate::error::{GraphError, GraphResult};
use async_trait::async_trait;
use skillgate_core::state::{AgentState, StateReducers, StateUpdate};
use std::collections::HashMap;
use std::sync::Arc;

/// Terminal pseudo-node.
pub const END: &str = "__end__";

/// Entry pseudo-node, usable as the source of [`StateGraph::add_edge`].
pub const START: &str = "__start__";

/// Name under which builders register the tool dispatch node.
pub const TOOLS_NODE: &str = "tools";

/// One step of a graph.
#[async_trait]
pub trait GraphNode: Send + Sync {
    async fn run(&self, state: &AgentState, config: &RunConfig) -> GraphResult<StateUpdate>;
}

/// Picks the next node from the current state.
pub type Router = Arc<dyn Fn(&AgentState) -> String + Send + Sync>;

/// Node backed by a synchronous closure.
pub struct FnNode<F> {
    func: F,
}

#[async_trait]
impl<F> GraphNode for FnNode<F>
where
    F: Fn(&AgentState) -> GraphResult<StateUpdate> + Send + Sync,
{
    async fn run(&self, state: &AgentState, _config: &RunConfig) -> GraphResult<StateUpdate> {
        (self.func)(state)
    }
}

/// Wrap a closure as a graph node.
pub fn node_fn<F>(func: F) -> Arc<dyn GraphNode>
where
    F: Fn(&AgentState) -> GraphResult<StateUpdate> + Send + Sync + 'static,
{
    Arc::new(FnNode { func })
}

#[derive(Clone)]
pub(crate) enum Edge {
    Direct(String),
    Conditional { router: Router, targets: Vec<String> },
}

/// Graph under construction. Each node has at most one outgoing edge; adding
/// another replaces it. A node without one ends the run.
pub struct StateGraph {
    nodes: HashMap<String, Arc<dyn GraphNode>>,
    edges: HashMap<String, Edge>,
    entry_point: Option<String>,
    reducers: StateReducers,
}

impl Default for StateGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl StateGraph {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry_point: None,
            reducers: StateReducers::default(),
        }
    }

    /// Replace the per-field reducers.
    pub fn with_reducers(mut self, reducers: StateReducers) -> Self {
        self.reducers = reducers;
        self
    }

    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        node: Arc<dyn GraphNode>,
    ) -> GraphResult<&mut Self> {
        let name = name.into();
        if name == END || name == START || name.is_empty() {
            return Err(GraphError::ReservedNodeName { name });
        }
        if self.nodes.contains_key(&name) {
            return Err(GraphError::DuplicateNode { name });
        }
        self.nodes.insert(name, node);
        Ok(self)
    }

    /// Unconditional edge. An edge from [`START`] sets the entry point.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        let from = from.into();
        let to = to.into();
        if from == START {
            self.entry_point = Some(to);
        } else {
            self.edges.insert(from, Edge::Direct(to));
        }
        self
    }

    /// Edge chosen at runtime by `router`, which must return one of `targets`
    /// or [`END`].
    pub fn add_conditional_edges<F>(
        &mut self,
        from: impl Into<String>,
        router: F,
        targets: &[&str],
    ) -> &mut Self
    where
        F: Fn(&AgentState) -> String + Send + Sync + 'static,
    {
        self.edges.insert(
            from.into(),
            Edge::Conditional {
                router: Arc::new(router),
                targets: targets.iter().map(|t| t.to_string()).collect(),
            },
        );
        self
    }

    pub fn set_entry_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry_point = Some(name.into());
        self
    }

    pub fn set_finish_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.add_edge(name, END)
    }

    /// Validate the wiring and freeze the graph.
    pub fn compile(self) -> GraphResult<CompiledGraph> {
        self.validate()?;
        Ok(CompiledGraph::new(
            self.nodes,
            self.edges,
            self.entry_point.unwrap_or_default(),
            self.reducers,
            None,
        ))
    }

    /// Like [`compile`](Self::compile), persisting state per thread.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer>,
    ) -> GraphResult<CompiledGraph> {
        self.validate()?;
        Ok(CompiledGraph::new(
            self.nodes,
            self.edges,
            self.entry_point.unwrap_or_default(),
            self.reducers,
            Some(checkpointer),
        ))
    }

    fn validate(&self) -> GraphResult<()> {
        let entry = self
            .entry_point
            .as_ref()
            .ok_or(GraphError::MissingEntryPoint)?;
        self.check_node(entry)?;

        for (from, edge) in &self.edges {
            self.check_node(from)?;
            match edge {
                Edge::Direct(to) => self.check_target(to)?,
                Edge::Conditional { targets, .. } => {
                    for target in targets {
                        self.check_target(target)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_node(&self, name: &str) -> GraphResult<()> {
        if self.nodes.contains_key(name) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode {
                name: name.to_string(),
            })
        }
    }

    fn check_target(&self, name: &str) -> GraphResult<()> {
        if name == END {
            Ok(())
        } else {
            self.check_node(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skillgate_core::message::Message;

    fn counter(name: &'static str) -> Arc<dyn GraphNode> {
        node_fn(move |state| {
            let count = state.extra.get("count").and_then(|v| v.as_u64()).unwrap_or(0);
            Ok(StateUpdate::new()
                .with_message(Message::assistant(name))
                .with_extra("count", json!(count + 1)))
        })
    }

    #[tokio::test]
    async fn runs_linear_graph() {
        let mut graph = StateGraph::new();
        graph.add_node("a", counter("a")).unwrap();
        graph.add_node("b", counter("b")).unwrap();
        graph.add_edge(START, "a").add_edge("a", "b").set_finish_point("b");

        let state = graph
            .compile()
            .unwrap()
            .invoke(StateUpdate::new(), &RunConfig::default())
            .await
            .unwrap();

        let contents: Vec<_> = state.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b"]);
        assert_eq!(state.extra["count"], json!(2));
    }

    #[tokio::test]
    async fn conditional_edges_loop_until_end() {
        let mut graph = StateGraph::new();
        graph.add_node("tick", counter("tick")).unwrap();
        graph.set_entry_point("tick").add_conditional_edges(
            "tick",
            |state: &AgentState| {
                if state.extra.get("count") == Some(&json!(3)) {
                    END.to_string()
                } else {
                    "tick".to_string()
                }
            },
            &["tick", END],
        );

        let state = graph
            .compile()
            .unwrap()
            .invoke(StateUpdate::new(), &RunConfig::default())
            .await
            .unwrap();
        assert_eq!(state.messages.len(), 3);
    }

    #[tokio::test]
    async fn recursion_limit_stops_runaway_loops() {
        let mut graph = StateGraph::new();
        graph.add_node("spin", counter("spin")).unwrap();
        graph.set_entry_point("spin").add_edge("spin", "spin");

        let err = graph
            .compile()
            .unwrap()
            .invoke(
                StateUpdate::new(),
                &RunConfig::default().with_recursion_limit(5),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::RecursionLimit { limit: 5 }));
    }

    #[test]
    fn compile_rejects_bad_wiring() {
        let graph = StateGraph::new();
        assert!(matches!(graph.compile(), Err(GraphError::MissingEntryPoint)));

        let mut graph = StateGraph::new();
        graph.add_node("a", counter("a")).unwrap();
        graph.set_entry_point("a").add_edge("a", "ghost");
        assert!(matches!(
            graph.compile(),
            Err(GraphError::UnknownNode { name }) if name == "ghost"
        ));
    }

    #[test]
    fn node_names_are_checked() {
        let mut graph = StateGraph::new();
        graph.add_node("a", counter("a")).unwrap();
        assert!(matches!(
            graph.add_node("a", counter("a")),
            Err(GraphError::DuplicateNode { .. })
        ));
        assert!(matches!(
            graph.add_node(END, counter("x")),
            Err(GraphError::ReservedNodeName { .. })
        ));
    }

    #[tokio::test]
    async fn router_must_pick_a_declared_target() {
        let mut graph = StateGraph::new();
        graph.add_node("a", counter("a")).unwrap();
        graph
            .set_entry_point("a")
            .add_conditional_edges("a", |_: &AgentState| "elsewhere".to_string(), &[END]);

        let err = graph
            .compile()
            .unwrap()
            .invoke(StateUpdate::new(), &RunConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode { name } if name == "elsewhere"));
    }
}
