//! Prelude module for convenient imports
//!
//! Import everything you need with:
//! ```rust
//! use curio::prelude::*;
//! ```

pub use crate::{
    CandidateLink, ChatBackend, ChatError, ChatMessage, CompletionOptions, CompletionRequest,
    ContextAssembler, Conversation, ConversationManager, ConversationStore, Dispatcher,
    DispatcherConfig, Draft, Exchange, LabelSuggestion, Link, LinkStore, LlmError, MemoryStore,
    Message, MessageRole, Priority, ProviderConfig, Role, Summary, SummaryKind, SummaryService,
    SummaryStore,
};
