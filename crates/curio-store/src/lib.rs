pub mod error;
pub mod memory;
pub mod models;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use models::{
    ChatMessage, Conversation, Draft, Link, MessageRole, Priority, Summary, SummaryKind,
};
pub use traits::{ConversationStore, KeyValueStore, LinkStore, PageTextCache, SummaryStore};
