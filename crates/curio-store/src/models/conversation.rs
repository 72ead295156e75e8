use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A multi-turn chat session scoped to a fixed set of links.
///
/// `link_ids` is stored in the order given, but matching is always
/// order-insensitive set equality: at most one active conversation may
/// exist per link set, and starting a conversation for an already-active
/// set returns the existing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub link_ids: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn new(link_ids: Vec<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            link_ids,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Order-insensitive set equality over link ids; duplicates collapse.
    pub fn links_match(&self, link_ids: &[String]) -> bool {
        let mine: BTreeSet<&str> = self.link_ids.iter().map(String::as_str).collect();
        let theirs: BTreeSet<&str> = link_ids.iter().map(String::as_str).collect();
        mine == theirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_links_match_ignores_order_and_duplicates() {
        let conversation = Conversation::new(ids(&["a", "b"]));

        assert!(conversation.links_match(&ids(&["b", "a"])));
        assert!(conversation.links_match(&ids(&["a", "b", "a"])));
        assert!(!conversation.links_match(&ids(&["a"])));
        assert!(!conversation.links_match(&ids(&["a", "b", "c"])));
    }

    #[test]
    fn test_new_conversation_is_active() {
        let conversation = Conversation::new(ids(&["a"]));
        assert!(conversation.is_active());
        assert!(conversation.ended_at.is_none());
    }
}
