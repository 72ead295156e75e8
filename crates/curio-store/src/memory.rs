use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{ChatMessage, Conversation, Link, Summary};
use crate::traits::{ConversationStore, KeyValueStore, LinkStore, PageTextCache, SummaryStore};

/// In-memory implementation of every store trait. Serves as the
/// reference implementation for tests and for embedders that do not
/// need durable storage.
#[derive(Default)]
pub struct MemoryStore {
    links: RwLock<HashMap<String, Link>>,
    conversations: RwLock<HashMap<String, Conversation>>,
    messages: RwLock<Vec<ChatMessage>>,
    summaries: RwLock<Vec<Summary>>,
    page_text: RwLock<HashMap<String, String>>,
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed extracted page text for a URL.
    pub async fn put_extracted_text(&self, url: impl Into<String>, text: impl Into<String>) {
        self.page_text.write().await.insert(url.into(), text.into());
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn get_link(&self, id: &str) -> Result<Option<Link>> {
        Ok(self.links.read().await.get(id).cloned())
    }

    async fn put_link(&self, link: Link) -> Result<()> {
        self.links.write().await.insert(link.id.clone(), link);
        Ok(())
    }

    async fn delete_link(&self, id: &str) -> Result<()> {
        self.links.write().await.remove(id);
        Ok(())
    }

    async fn list_links(&self) -> Result<Vec<Link>> {
        let mut links: Vec<Link> = self.links.read().await.values().cloned().collect();
        links.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(links)
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn put_conversation(&self, conversation: Conversation) -> Result<()> {
        self.conversations
            .write()
            .await
            .insert(conversation.id.clone(), conversation);
        Ok(())
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.conversations.read().await.get(id).cloned())
    }

    async fn delete_conversation(&self, id: &str) -> Result<()> {
        self.conversations.write().await.remove(id);
        Ok(())
    }

    async fn find_active_for_links(&self, link_ids: &[String]) -> Result<Option<Conversation>> {
        Ok(self
            .conversations
            .read()
            .await
            .values()
            .find(|c| c.is_active() && c.links_match(link_ids))
            .cloned())
    }

    async fn put_message(&self, message: ChatMessage) -> Result<()> {
        self.messages.write().await.push(message);
        Ok(())
    }

    async fn delete_message(&self, id: &str) -> Result<()> {
        self.messages.write().await.retain(|m| m.id != id);
        Ok(())
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<ChatMessage>> {
        let mut messages: Vec<ChatMessage> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        // stable sort keeps insertion order for equal timestamps
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }
}

#[async_trait]
impl SummaryStore for MemoryStore {
    async fn put_summary(&self, summary: Summary) -> Result<()> {
        self.summaries.write().await.push(summary);
        Ok(())
    }

    async fn delete_summary(&self, id: &str) -> Result<()> {
        self.summaries.write().await.retain(|s| s.id != id);
        Ok(())
    }

    async fn get_summaries(&self, link_id: &str) -> Result<Vec<Summary>> {
        let mut summaries: Vec<Summary> = self
            .summaries
            .read()
            .await
            .iter()
            .filter(|s| s.link_id == link_id)
            .cloned()
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }
}

#[async_trait]
impl PageTextCache for MemoryStore {
    async fn get_extracted_text(&self, url: &str) -> Result<Option<String>> {
        Ok(self.page_text.read().await.get(url).cloned())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummaryKind;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_active_conversation_lookup_is_order_insensitive() {
        let store = MemoryStore::new();
        let conversation = Conversation::new(ids(&["a", "b"]));
        let id = conversation.id.clone();
        store.put_conversation(conversation).await.unwrap();

        let found = store
            .find_active_for_links(&ids(&["b", "a"]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
    }

    #[tokio::test]
    async fn test_ended_conversations_are_not_active() {
        let store = MemoryStore::new();
        let mut conversation = Conversation::new(ids(&["a"]));
        conversation.ended_at = Some(chrono::Utc::now());
        store.put_conversation(conversation).await.unwrap();

        let found = store.find_active_for_links(&ids(&["a"])).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_messages_ordered_by_timestamp() {
        let store = MemoryStore::new();

        let mut first = ChatMessage::user("c1", "first");
        let mut second = ChatMessage::assistant("c1", "second");
        first.created_at = chrono::Utc::now() - chrono::Duration::seconds(10);
        second.created_at = chrono::Utc::now();

        // insert out of order
        store.put_message(second).await.unwrap();
        store.put_message(first).await.unwrap();

        let messages = store.get_messages("c1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
    }

    #[tokio::test]
    async fn test_summaries_newest_first() {
        let store = MemoryStore::new();

        let mut old = Summary::new("l1", SummaryKind::Tldr, None, "old");
        old.created_at = chrono::Utc::now() - chrono::Duration::seconds(60);
        let fresh = Summary::new("l1", SummaryKind::Tldr, None, "fresh");

        store.put_summary(old).await.unwrap();
        store.put_summary(fresh).await.unwrap();

        let summaries = store.get_summaries("l1").await.unwrap();
        assert_eq!(summaries[0].content, "fresh");
        assert_eq!(summaries[1].content, "old");
    }
}
