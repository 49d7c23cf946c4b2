use super::{Checkpoint, Checkpointer, Edge, END, GraphNode};
use crate::error::{GraphError, GraphResult};
use async_trait::async_trait;
use skillgate_core::config::{DEFAULT_RECURSION_LIMIT, SkillgateConfig};
use skillgate_core::state::{AgentState, StateReducers, StateUpdate};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Per-invocation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Conversation thread used to load and save checkpoints
    pub thread_id: String,
    /// Maximum node executions in one invocation
    pub recursion_limit: usize,
}

impl RunConfig {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// A run on a fresh, randomly named thread.
    pub fn ephemeral() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    /// Thread `thread_id` with the recursion limit from `config`.
    pub fn from_config(config: &SkillgateConfig, thread_id: impl Into<String>) -> Self {
        Self::new(thread_id).with_recursion_limit(config.agent.recursion_limit)
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::ephemeral()
    }
}

struct GraphInner {
    nodes: HashMap<String, Arc<dyn GraphNode>>,
    edges: HashMap<String, Edge>,
    entry_point: String,
    reducers: StateReducers,
}

/// A validated graph ready to run. Cheap to clone.
#[derive(Clone)]
pub struct CompiledGraph {
    inner: Arc<GraphInner>,
    checkpointer: Option<Arc<dyn Checkpointer>>,
}

impl CompiledGraph {
    pub(crate) fn new(
        nodes: HashMap<String, Arc<dyn GraphNode>>,
        edges: HashMap<String, Edge>,
        entry_point: String,
        reducers: StateReducers,
        checkpointer: Option<Arc<dyn Checkpointer>>,
    ) -> Self {
        Self {
            inner: Arc::new(GraphInner {
                nodes,
                edges,
                entry_point,
                reducers,
            }),
            checkpointer,
        }
    }

    /// Run one turn.
    ///
    /// With a checkpointer the run resumes from the thread's latest state and
    /// `input` is folded into it; otherwise it starts from an empty state.
    pub async fn invoke(&self, input: StateUpdate, config: &RunConfig) -> GraphResult<AgentState> {
        let mut state = match self.get_state(&config.thread_id).await? {
            Some(state) => state,
            None => AgentState::default(),
        };
        self.inner.reducers.apply(&mut state, input);
        self.execute(state, config, self.checkpointer.as_deref()).await
    }

    /// Latest checkpointed state of a thread.
    pub async fn get_state(&self, thread_id: &str) -> GraphResult<Option<AgentState>> {
        match &self.checkpointer {
            Some(checkpointer) => Ok(checkpointer
                .latest(thread_id)
                .await?
                .map(|checkpoint| checkpoint.state)),
            None => Ok(None),
        }
    }

    pub fn entry_point(&self) -> &str {
        &self.inner.entry_point
    }

    /// Node names, sorted.
    pub fn node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.nodes.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_checkpointer(&self) -> bool {
        self.checkpointer.is_some()
    }

    async fn execute(
        &self,
        mut state: AgentState,
        config: &RunConfig,
        checkpointer: Option<&dyn Checkpointer>,
    ) -> GraphResult<AgentState> {
        let mut current = self.inner.entry_point.clone();
        let mut steps = 0;

        loop {
            if steps >= config.recursion_limit {
                return Err(GraphError::RecursionLimit {
                    limit: config.recursion_limit,
                });
            }
            steps += 1;

            let node = self
                .inner
                .nodes
                .get(&current)
                .ok_or_else(|| GraphError::UnknownNode {
                    name: current.clone(),
                })?;
            debug!(node = %current, step = steps, thread = %config.thread_id, "Running node");

            let update = node.run(&state, config).await?;
            self.inner.reducers.apply(&mut state, update);

            if let Some(checkpointer) = checkpointer {
                checkpointer
                    .put(Checkpoint::new(&config.thread_id, state.clone(), steps))
                    .await?;
            }

            let next = self.next_node(&current, &state)?;
            if next == END {
                break;
            }
            current = next;
        }

        info!(steps, thread = %config.thread_id, "Graph run finished");
        Ok(state)
    }

    fn next_node(&self, current: &str, state: &AgentState) -> GraphResult<String> {
        match self.inner.edges.get(current) {
            None => Ok(END.to_string()),
            Some(Edge::Direct(to)) => Ok(to.clone()),
            Some(Edge::Conditional { router, targets }) => {
                let target = router(state);
                if target == END || targets.contains(&target) {
                    Ok(target)
                } else {
                    Err(GraphError::UnknownNode { name: target })
                }
            }
        }
    }
}

/// A compiled graph used as a node of another graph hands back only what it
/// changed. Checkpointing is left to the outer graph.
#[async_trait]
impl GraphNode for CompiledGraph {
    async fn run(&self, state: &AgentState, config: &RunConfig) -> GraphResult<StateUpdate> {
        let after = self.execute(state.clone(), config, None).await?;
        Ok(after.delta_since(state))
    }
}

impl std::fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("entry_point", &self.inner.entry_point)
            .field("nodes", &self.node_names())
            .field("checkpointer", &self.has_checkpointer())
            .finish()
    }
}
