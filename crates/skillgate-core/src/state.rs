//! Conversation state and the per-field reducers that merge updates into it.
//!
//! Steps never mutate [`AgentState`] directly. They return a [`StateUpdate`]
//! and the graph folds it in through [`StateReducers`], one reducer per field:
//!
//! | Field             | Reducer                                   |
//! |-------------------|-------------------------------------------|
//! | `messages`        | [`add_messages`]: replace by id, else append |
//! | `sender`          | [`keep_latest`]: last written value wins  |
//! | `available_tools` | [`union`]: set union, never shrinks       |
//! | `loaded_skills`   | [`append`]: duplicates kept               |
//! | `extra`           | [`merge_keys`]: overwrite per key         |
//!
//! Union and per-key overwrite are idempotent, so replaying an update after a
//! resumed turn leaves `available_tools` unchanged.

use crate::message::Message;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

/// State shared by every step of a conversation thread.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub messages: Vec<Message>,
    /// Last step that produced a tool-calling response
    #[serde(default)]
    pub sender: Option<String>,
    /// Tool names currently callable. Empty means unrestricted.
    #[serde(default)]
    pub available_tools: BTreeSet<String>,
    #[serde(default)]
    pub loaded_skills: Vec<String>,
    /// Caller-defined fields
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl AgentState {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// State holding a single user message.
    pub fn from_user(content: impl Into<String>) -> Self {
        Self::new(vec![Message::user(content)])
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Whether `available_tools` currently restricts the tool set.
    pub fn is_restricted(&self) -> bool {
        !self.available_tools.is_empty()
    }

    /// The update that turns `before` into `self`.
    ///
    /// Used when a compiled graph runs as a node of a parent graph: only the
    /// changes it made are handed back to the parent's reducers.
    pub fn delta_since(&self, before: &AgentState) -> StateUpdate {
        let messages = self
            .messages
            .iter()
            .filter(|message| !before.messages.contains(message))
            .cloned()
            .collect();

        let sender = if self.sender != before.sender {
            self.sender.clone()
        } else {
            None
        };

        let available_tools = self
            .available_tools
            .difference(&before.available_tools)
            .cloned()
            .collect();

        let loaded_skills = self
            .loaded_skills
            .get(before.loaded_skills.len()..)
            .map(<[String]>::to_vec)
            .unwrap_or_default();

        let extra = self
            .extra
            .iter()
            .filter(|(key, value)| before.extra.get(*key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        StateUpdate {
            messages,
            sender,
            available_tools,
            loaded_skills,
            extra,
        }
    }
}

/// Partial state returned by a step or a tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub available_tools: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loaded_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_available_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_tools.extend(tools.into_iter().map(Into::into));
        self
    }

    pub fn with_loaded_skill(mut self, skill: impl Into<String>) -> Self {
        self.loaded_skills.push(skill.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
            && self.sender.is_none()
            && self.available_tools.is_empty()
            && self.loaded_skills.is_empty()
            && self.extra.is_empty()
    }

    /// Fold `later` into this update with the same rules the reducers apply.
    pub fn merge(&mut self, later: StateUpdate) {
        self.messages.extend(later.messages);
        keep_latest(&mut self.sender, later.sender);
        union(&mut self.available_tools, later.available_tools);
        append(&mut self.loaded_skills, later.loaded_skills);
        merge_keys(&mut self.extra, later.extra);
    }
}

/// Merge function for one state field.
pub type Reducer<T> = fn(&mut T, T);

/// Reducers applied to each [`AgentState`] field on every write.
#[derive(Debug, Clone, Copy)]
pub struct StateReducers {
    pub messages: Reducer<Vec<Message>>,
    pub sender: Reducer<Option<String>>,
    pub available_tools: Reducer<BTreeSet<String>>,
    pub loaded_skills: Reducer<Vec<String>>,
    pub extra: Reducer<Map<String, Value>>,
}

impl Default for StateReducers {
    fn default() -> Self {
        Self {
            messages: add_messages,
            sender: keep_latest,
            available_tools: union,
            loaded_skills: append,
            extra: merge_keys,
        }
    }
}

impl StateReducers {
    /// Apply `update` to `state`, field by field.
    pub fn apply(&self, state: &mut AgentState, update: StateUpdate) {
        (self.messages)(&mut state.messages, update.messages);
        (self.sender)(&mut state.sender, update.sender);
        (self.available_tools)(&mut state.available_tools, update.available_tools);
        (self.loaded_skills)(&mut state.loaded_skills, update.loaded_skills);
        (self.extra)(&mut state.extra, update.extra);
    }
}

/// Append new messages; a message whose id already exists replaces it in place.
pub fn add_messages(current: &mut Vec<Message>, update: Vec<Message>) {
    let mut known: HashSet<String> = current.iter().map(|m| m.id.clone()).collect();
    for message in update {
        if known.contains(&message.id) {
            if let Some(slot) = current.iter_mut().find(|m| m.id == message.id) {
                *slot = message;
            }
        } else {
            known.insert(message.id.clone());
            current.push(message);
        }
    }
}

/// Overwrite with the update when it carries a value.
pub fn keep_latest<T>(current: &mut Option<T>, update: Option<T>) {
    if update.is_some() {
        *current = update;
    }
}

pub fn union(current: &mut BTreeSet<String>, update: BTreeSet<String>) {
    current.extend(update);
}

pub fn append(current: &mut Vec<String>, update: Vec<String>) {
    current.extend(update);
}

pub fn merge_keys(current: &mut Map<String, Value>, update: Map<String, Value>) {
    for (key, value) in update {
        current.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn union_never_shrinks() {
        let reducers = StateReducers::default();
        let mut state = AgentState::default();

        reducers.apply(
            &mut state,
            StateUpdate::new().with_available_tools(["web_search", "calculate"]),
        );
        reducers.apply(&mut state, StateUpdate::new().with_available_tools(["sql_query"]));

        let tools: Vec<_> = state.available_tools.iter().map(String::as_str).collect();
        assert_eq!(tools, vec!["calculate", "sql_query", "web_search"]);
    }

    #[test]
    fn replaying_an_update_is_idempotent_for_tools() {
        let reducers = StateReducers::default();
        let update = StateUpdate::new()
            .with_available_tools(["calculate"])
            .with_loaded_skill("math");
        let mut state = AgentState::default();

        reducers.apply(&mut state, update.clone());
        let tools_once = state.available_tools.clone();
        reducers.apply(&mut state, update);

        assert_eq!(state.available_tools, tools_once);
        assert_eq!(state.loaded_skills, vec!["math", "math"]);
    }

    #[test]
    fn messages_with_known_id_are_replaced() {
        let mut history = vec![Message::user("a").with_id("1"), Message::user("b").with_id("2")];
        add_messages(
            &mut history,
            vec![Message::user("b2").with_id("2"), Message::user("c").with_id("3")],
        );

        let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b2", "c"]);
    }

    #[test]
    fn sender_keeps_previous_when_update_is_silent() {
        let mut sender = Some("analyst".to_string());
        keep_latest(&mut sender, None);
        assert_eq!(sender.as_deref(), Some("analyst"));
        keep_latest(&mut sender, Some("writer".to_string()));
        assert_eq!(sender.as_deref(), Some("writer"));
    }

    #[test]
    fn merging_updates_matches_applying_them_in_order() {
        let first = StateUpdate::new()
            .with_message(Message::tool_result("c1", "ok").with_id("t1"))
            .with_available_tools(["a"])
            .with_loaded_skill("one");
        let second = StateUpdate::new()
            .with_message(Message::tool_result("c2", "ok").with_id("t2"))
            .with_available_tools(["b"])
            .with_loaded_skill("two")
            .with_extra("step", json!(2));

        let reducers = StateReducers::default();
        let mut sequential = AgentState::default();
        reducers.apply(&mut sequential, first.clone());
        reducers.apply(&mut sequential, second.clone());

        let mut folded = first;
        folded.merge(second);
        let mut merged = AgentState::default();
        reducers.apply(&mut merged, folded);

        assert_eq!(sequential, merged);
    }

    #[test]
    fn delta_contains_only_changes() {
        let before = AgentState {
            messages: vec![Message::user("hi").with_id("u1")],
            available_tools: ["a".to_string()].into(),
            loaded_skills: vec!["one".into()],
            extra: Map::from_iter([("kept".to_string(), json!(1))]),
            ..AgentState::default()
        };
        let mut after = before.clone();
        after.messages.push(Message::assistant("hello").with_id("a1"));
        after.available_tools.insert("b".into());
        after.loaded_skills.push("two".into());
        after.extra.insert("new".into(), json!(true));
        after.sender = Some("agent".into());

        let delta = after.delta_since(&before);
        assert_eq!(delta.messages.len(), 1);
        assert_eq!(delta.messages[0].id, "a1");
        assert_eq!(delta.available_tools, BTreeSet::from(["b".to_string()]));
        assert_eq!(delta.loaded_skills, vec!["two"]);
        assert_eq!(delta.sender.as_deref(), Some("agent"));
        assert_eq!(delta.extra.len(), 1);
        assert!(delta.extra.contains_key("new"));
    }

    #[test]
    fn empty_update() {
        assert!(StateUpdate::new().is_empty());
        assert!(!StateUpdate::new().with_sender("x").is_empty());
    }
}
