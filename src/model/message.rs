//! Conversation messages exchanged with the reasoning backend.

use serde_json::Value;

/// A tool invocation requested by the backend inside an assistant message.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    /// Backend-assigned id, echoed back on the matching tool message.
    pub id: String,

    pub name: String,

    /// Arguments as the backend sent them. Usually an object; kept as-is otherwise.
    pub arguments: Value,
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    System(String),

    User(String),

    Assistant {
        content: String,
        tool_calls: Vec<ToolCallRequest>,
    },

    /// The text result of one tool call.
    Tool { tool_call_id: String, content: String },
}

impl Message {
    /// An assistant message with text only.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Tool calls requested by this message. Empty for anything but an assistant message.
    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        match self {
            Self::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }
}

/// An append-only, single-run conversation.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation from the system instructions and the seed text.
    pub fn seeded(system: impl Into<String>, seed: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::System(system.into()), Message::User(seed.into())],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Text of the most recent assistant message, if any.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Assistant { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}
