//! # Curio
//!
//! AI orchestration core for a personal research-link manager: the user
//! saves links from a browser extension, then organizes them and chats
//! with an assistant about the saved pages.
//!
//! ## Overview
//!
//! Curio provides the non-UI machinery behind that dashboard:
//!
//! - **Dispatch** LLM requests under per-provider concurrency limits,
//!   with retry, backoff and ordered provider failover
//! - **Stream** responses as incremental deltas with clean cancellation
//! - **Assemble context** for a set of pages from cached summaries and
//!   extracted page text, under a token budget
//! - **Manage conversations** keyed by the set of pages being discussed
//! - **Summarize pages** on demand (tl;dr, bullets, quotes, insights,
//!   custom prompts)
//! - **Suggest** labels, priority and board for a new link by cosine
//!   similarity against already-saved links
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use curio::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dispatcher = Arc::new(
//!         Dispatcher::builder()
//!             .provider(ProviderConfig::openai(std::env::var("OPENAI_API_KEY")?))
//!             .build()?,
//!     );
//!
//!     let store = Arc::new(MemoryStore::new());
//!     let assembler = ContextAssembler::new(store.clone(), store.clone());
//!     let manager = ConversationManager::new(
//!         store.clone(),
//!         store.clone(),
//!         assembler,
//!         dispatcher,
//!         "gpt-4o-mini",
//!     );
//!
//!     let conversation = manager
//!         .start_conversation(&["link-1".to_string()])
//!         .await?;
//!     let exchange = manager
//!         .send_message_streaming(&conversation.id, "What is this page about?", |text| {
//!             print!("\r{}", text);
//!         })
//!         .await?;
//!     println!("\n{}", exchange.assistant.content);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Curio is organized into focused crates:
//!
//! - **`curio-llm`**: request dispatcher, provider backends, SSE stream
//!   assembly
//! - **`curio-store`**: domain models and store traits, with an
//!   in-memory reference implementation
//! - **`curio-context`**: system-prompt assembly under a token budget
//! - **`curio-chat`**: conversation manager and summary service
//! - **`curio-suggest`**: tokenizer, cosine similarity and suggestions
//!
//! ## License
//!
//! MIT

pub mod prelude;

pub use curio_llm::{
    ChatBackend, CompletionOptions, CompletionRequest, DeltaStream, Dispatcher,
    DispatcherBuilder, DispatcherConfig, HttpBackend, LlmError, Message, ProviderConfig, Role,
};

pub use curio_store::{
    ChatMessage, Conversation, ConversationStore, Draft, KeyValueStore, Link, LinkStore,
    MemoryStore, MessageRole, PageTextCache, Priority, StoreError, Summary, SummaryKind,
    SummaryStore,
};

pub use curio_context::{ContextAssembler, RESEARCH_ASSISTANT_PREAMBLE};

pub use curio_chat::{ChatError, ConversationManager, Exchange, SummaryService};

pub use curio_suggest::{
    cosine_similarity, frequency, suggest_board, suggest_labels, suggest_priority, tokenize,
    CandidateLink, LabelSuggestion,
};
