use crate::error::Result;
use crate::types::CompletionRequest;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Stream of raw content fragments emitted by a provider during a
/// streaming completion. Dropping the stream aborts the underlying
/// transport read.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A single chat-completion provider endpoint.
///
/// The dispatcher iterates an ordered list of backends for failover, so
/// adding a provider never requires control-flow changes. Tests inject
/// scripted implementations through this seam.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Provider name used in logs and error messages.
    fn name(&self) -> &str;

    /// Non-streaming completion; returns the full response text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Streaming completion; yields content fragments as they arrive.
    async fn complete_stream(&self, request: &CompletionRequest) -> Result<DeltaStream>;
}
