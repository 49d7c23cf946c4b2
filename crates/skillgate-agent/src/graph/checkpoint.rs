use crate::error::GraphResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use skillgate_core::state::AgentState;
use std::collections::VecDeque;
use uuid::Uuid;

/// Snapshot of a thread's state after one node ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: String,
    pub thread_id: String,
    pub state: AgentState,
    /// Node executions so far in the run that wrote this checkpoint
    pub step: usize,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(thread_id: impl Into<String>, state: AgentState, step: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            thread_id: thread_id.into(),
            state,
            step,
            created_at: Utc::now(),
        }
    }
}

/// Storage for per-thread checkpoints.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    async fn put(&self, checkpoint: Checkpoint) -> GraphResult<()>;

    async fn latest(&self, thread_id: &str) -> GraphResult<Option<Checkpoint>>;

    /// Retained checkpoints of a thread, oldest first.
    async fn history(&self, thread_id: &str) -> GraphResult<Vec<Checkpoint>>;
}

/// Checkpoints kept per thread unless configured otherwise.
pub const DEFAULT_MAX_HISTORY: usize = 64;

/// Process-local checkpointer.
///
/// Each thread keeps at most `max_history` checkpoints; older ones are
/// dropped as new ones arrive. The latest checkpoint is always kept.
#[derive(Debug)]
pub struct InMemoryCheckpointer {
    threads: DashMap<String, VecDeque<Checkpoint>>,
    max_history: usize,
}

impl Default for InMemoryCheckpointer {
    fn default() -> Self {
        Self::with_max_history(DEFAULT_MAX_HISTORY)
    }
}

impl InMemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `max_history` checkpoints per thread (at least one).
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            threads: DashMap::new(),
            max_history: max_history.max(1),
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn thread_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.threads.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Drop a thread's history. Returns whether it existed.
    pub fn clear(&self, thread_id: &str) -> bool {
        self.threads.remove(thread_id).is_some()
    }
}

#[async_trait]
impl Checkpointer for InMemoryCheckpointer {
    async fn put(&self, checkpoint: Checkpoint) -> GraphResult<()> {
        let mut history = self
            .threads
            .entry(checkpoint.thread_id.clone())
            .or_default();
        history.push_back(checkpoint);
        while history.len() > self.max_history {
            history.pop_front();
        }
        Ok(())
    }

    async fn latest(&self, thread_id: &str) -> GraphResult<Option<Checkpoint>> {
        Ok(self
            .threads
            .get(thread_id)
            .and_then(|history| history.back().cloned()))
    }

    async fn history(&self, thread_id: &str) -> GraphResult<Vec<Checkpoint>> {
        Ok(self
            .threads
            .get(thread_id)
            .map(|history| history.iter().cloned().collect())
            .unwrap_or_default())
    }
}
