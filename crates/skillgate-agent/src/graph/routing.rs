use super::{END, TOOLS_NODE};
use skillgate_core::state::AgentState;

/// Route to the tools node when the last message requests tool calls.
pub fn tools_condition(state: &AgentState) -> String {
    match state.last_message() {
        Some(message) if message.has_tool_calls() => TOOLS_NODE.to_string(),
        _ => END.to_string(),
    }
}

/// Route back to the step that issued the pending tool calls.
pub fn route_to_sender(state: &AgentState) -> String {
    state.sender.clone().unwrap_or_else(|| END.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skillgate_core::message::{Message, ToolCallRequest};

    #[test]
    fn tool_calls_route_to_tools() {
        let mut state = AgentState::from_user("hi");
        assert_eq!(tools_condition(&state), END);

        state.messages.push(Message::assistant_with_tool_calls(
            "",
            vec![ToolCallRequest::new("search", json!({}))],
        ));
        assert_eq!(tools_condition(&state), TOOLS_NODE);

        state.messages.push(Message::assistant("done"));
        assert_eq!(tools_condition(&state), END);
    }

    #[test]
    fn sender_routing_falls_back_to_end() {
        let mut state = AgentState::default();
        assert_eq!(route_to_sender(&state), END);
        state.sender = Some("researcher".into());
        assert_eq!(route_to_sender(&state), "researcher");
    }
}
