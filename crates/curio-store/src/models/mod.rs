mod conversation;
mod link;
mod message;
mod summary;

pub use conversation::Conversation;
pub use link::{Draft, Link, Priority};
pub use message::{ChatMessage, MessageRole};
pub use summary::{Summary, SummaryKind};
