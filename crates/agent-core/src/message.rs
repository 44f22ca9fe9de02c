//! Conversation Messages
//!
//! Provider-neutral transcript of one agent run: instructions, the user's
//! task, assistant turns (possibly requesting tools) and tool results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tool::ToolCall;

/// Role of a message sender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Result of a tool call, fed back to the model
    Tool,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    pub content: String,

    /// Tool name, set on tool results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Tool calls the assistant requested in this turn
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// Call a tool result answers; absent for text-protocol results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,

    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            tool_calls: Vec::new(),
            call_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Assistant turn that requests tool calls
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    /// Tool result with an optional call ID
    pub fn tool(content: impl Into<String>, call_id: Option<String>) -> Self {
        Self {
            call_id,
            ..Self::new(Role::Tool, content)
        }
    }

    /// Tool result answering `call`, carrying its name and ID
    pub fn tool_result(call: &ToolCall, content: impl Into<String>) -> Self {
        Self::tool(content, call.id.clone()).with_name(&call.name)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn tool_call_id(&self) -> Option<&str> {
        self.call_id.as_deref()
    }
}

/// Ordered message history of a run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(prompt)],
        }
    }

    /// Put a system prompt first unless the history already starts with one
    pub fn ensure_system_prompt(&mut self, prompt: impl FnOnce() -> String) {
        if self.messages.first().map(|m| m.role) != Some(Role::System) {
            self.messages.insert(0, Message::system(prompt()));
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of tool results recorded so far
    pub fn tool_result_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::Tool).count()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_answers_its_call() {
        let call = ToolCall::new("house_price").with_id("call_1");
        let msg = Message::tool_result(&call, "350000");

        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id(), Some("call_1"));
        assert_eq!(msg.name.as_deref(), Some("house_price"));
    }

    #[test]
    fn test_system_prompt_is_inserted_once() {
        let mut conv = Conversation::new();
        conv.push(Message::user("Fix the gutter"));

        conv.ensure_system_prompt(|| "You are a home renovation expert.".into());
        conv.ensure_system_prompt(|| "ignored".into());

        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages()[0].role, Role::System);
        assert_eq!(conv.messages()[0].content, "You are a home renovation expert.");
        assert_eq!(conv.last().unwrap().role, Role::User);
    }

    #[test]
    fn test_tool_result_count() {
        let mut conv = Conversation::with_system_prompt("system");
        conv.push(Message::assistant_with_tools("", vec![ToolCall::new("house_price")]));
        conv.push(Message::tool("350000", None));
        conv.push(Message::assistant("{}"));

        assert_eq!(conv.tool_result_count(), 1);
        assert!(conv.messages()[1].tool_calls.len() == 1);
        assert_eq!(Role::Tool.to_string(), "tool");
    }
}
