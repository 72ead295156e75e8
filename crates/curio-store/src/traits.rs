use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChatMessage, Conversation, Link, Summary};

/// Saved-link lookup and persistence.
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn get_link(&self, id: &str) -> Result<Option<Link>>;

    async fn put_link(&self, link: Link) -> Result<()>;

    async fn delete_link(&self, id: &str) -> Result<()>;

    /// All saved links; candidate set for the suggestion engine.
    async fn list_links(&self) -> Result<Vec<Link>>;
}

/// Conversations and their messages.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn put_conversation(&self, conversation: Conversation) -> Result<()>;

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>>;

    async fn delete_conversation(&self, id: &str) -> Result<()>;

    /// The active (not ended) conversation whose link set equals the
    /// given set, order-insensitively. At most one such conversation
    /// exists at a time.
    async fn find_active_for_links(&self, link_ids: &[String]) -> Result<Option<Conversation>>;

    async fn put_message(&self, message: ChatMessage) -> Result<()>;

    async fn delete_message(&self, id: &str) -> Result<()>;

    /// All messages of a conversation, ordered by timestamp.
    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<ChatMessage>>;
}

/// Per-link AI summaries.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn put_summary(&self, summary: Summary) -> Result<()>;

    async fn delete_summary(&self, id: &str) -> Result<()>;

    /// Summaries for a link, most recent first.
    async fn get_summaries(&self, link_id: &str) -> Result<Vec<Summary>>;
}

/// Extracted page text captured by the browser extension. Consumers
/// treat lookup failures as "absent".
#[async_trait]
pub trait PageTextCache: Send + Sync {
    async fn get_extracted_text(&self, url: &str) -> Result<Option<String>>;
}

/// Ancillary key-value state (e.g. reusable custom prompt templates),
/// injected so it can be swapped or mocked like the main store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn put(&self, key: &str, value: String) -> Result<()>;
}
