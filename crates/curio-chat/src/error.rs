use curio_llm::LlmError;
use curio_store::StoreError;
use thiserror::Error;

/// Turn-level failures. Dispatcher and store errors pass through
/// untranslated; the manager only adds the guarantee that a user's
/// message is never lost on failure.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("link not found: {0}")]
    LinkNotFound(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ChatError>;
