use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One turn of a conversation. Immutable once persisted; an in-flight
/// assistant reply is committed only when its final content is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub conversation_id: String,
    /// Attribution for legacy single-link chats; unset for multi-link
    /// conversations.
    pub link_id: Option<String>,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(conversation_id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            link_id: None,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(conversation_id, MessageRole::User, content)
    }

    pub fn assistant(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(conversation_id, MessageRole::Assistant, content)
    }

    pub fn with_link(mut self, link_id: Option<String>) -> Self {
        self.link_id = link_id;
        self
    }
}

/// System messages are never rendered in history views and are excluded
/// from the message list sent back to providers (the context preamble is
/// attached fresh per call instead).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}
