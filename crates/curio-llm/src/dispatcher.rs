use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use rand::Rng;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::warn;

use crate::backend::{ChatBackend, DeltaStream};
use crate::config::{DispatcherConfig, ProviderConfig};
use crate::error::{LlmError, Result};
use crate::http::HttpBackend;
use crate::types::CompletionRequest;

struct ProviderSlot {
    backend: Arc<dyn ChatBackend>,
    limiter: Arc<Semaphore>,
}

/// Issues chat-completion requests under per-provider concurrency and
/// reliability constraints, hiding provider selection from callers.
///
/// Each provider owns a fair semaphore of `max_in_flight` permits;
/// waiters are started in submission order as slots free up. Transient
/// failures (network, timeout, 429, 5xx) are retried with exponential
/// backoff plus jitter; when a provider runs out of attempts the next
/// configured provider is tried. A dispatcher is an explicit instance;
/// independent dispatchers never share queue state.
pub struct Dispatcher {
    providers: Vec<ProviderSlot>,
    retry_limit: u32,
    base_delay: Duration,
    request_timeout: Duration,
    stream_timeout: Duration,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn from_config(config: DispatcherConfig) -> Result<Self> {
        let mut builder = DispatcherBuilder::new()
            .retry_limit(config.retry_limit)
            .base_delay(config.base_delay)
            .request_timeout(config.request_timeout)
            .stream_timeout(config.stream_timeout);
        for provider in config.providers {
            builder = builder.provider(provider);
        }
        builder.build()
    }

    /// Blocking completion: suspends until a full response is available
    /// or every configured provider is exhausted.
    pub async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let mut last: Option<LlmError> = None;

        for slot in &self.providers {
            match self.call_provider(slot, &request).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(provider = slot.backend.name(), error = %e, "provider failed");
                    last = Some(e);
                }
            }
        }

        Err(Self::escalate(last))
    }

    /// Streaming completion: invokes `on_delta` with the accumulated
    /// text so far each time a fragment arrives, and returns the final
    /// accumulation, which equals the last callback payload.
    pub async fn complete_streaming<F>(
        &self,
        request: CompletionRequest,
        mut on_delta: F,
    ) -> Result<String>
    where
        F: FnMut(&str) + Send,
    {
        let mut stream = self.stream(request).await?;

        let drain = async {
            let mut accumulated = String::new();
            while let Some(item) = stream.next().await {
                match item {
                    Ok(fragment) => {
                        accumulated.push_str(&fragment);
                        on_delta(&accumulated);
                    }
                    // Once fragments have been delivered a retry would
                    // restart accumulation, so mid-stream failures
                    // escalate instead.
                    Err(e) => return Err(Self::escalate(Some(e))),
                }
            }
            Ok(accumulated)
        };

        let accumulated = timeout(self.stream_timeout, drain)
            .await
            .map_err(|_| LlmError::Timeout(self.stream_timeout))??;

        if accumulated.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(accumulated)
    }

    /// Open a delta stream, applying retry and provider failover to
    /// stream establishment. The returned stream owns its concurrency
    /// permit: dropping it aborts the transport read and frees the slot
    /// immediately, and nothing is persisted on behalf of the caller.
    pub async fn stream(&self, request: CompletionRequest) -> Result<DeltaStream> {
        let mut last: Option<LlmError> = None;

        for slot in &self.providers {
            match self.open_stream(slot, &request).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    warn!(provider = slot.backend.name(), error = %e, "provider failed");
                    last = Some(e);
                }
            }
        }

        Err(Self::escalate(last))
    }

    async fn call_provider(
        &self,
        slot: &ProviderSlot,
        request: &CompletionRequest,
    ) -> Result<String> {
        let mut attempt = 0;
        loop {
            let outcome = {
                let _permit = slot
                    .limiter
                    .acquire()
                    .await
                    .map_err(|_| LlmError::Configuration("dispatcher is shut down".to_string()))?;

                match timeout(self.request_timeout, slot.backend.complete(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(LlmError::Timeout(self.request_timeout)),
                }
                // permit released here, before any backoff sleep
            };

            match outcome {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.retry_limit => {
                    let delay = self.backoff_delay(attempt);
                    warn!(
                        provider = slot.backend.name(),
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn open_stream(
        &self,
        slot: &ProviderSlot,
        request: &CompletionRequest,
    ) -> Result<DeltaStream> {
        let mut attempt = 0;
        loop {
            let permit = slot
                .limiter
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| LlmError::Configuration("dispatcher is shut down".to_string()))?;

            let outcome = match timeout(self.request_timeout, slot.backend.complete_stream(request))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(LlmError::Timeout(self.request_timeout)),
            };

            match outcome {
                Ok(mut inner) => {
                    return Ok(Box::pin(async_stream::stream! {
                        let _permit = permit;
                        while let Some(item) = inner.next().await {
                            yield item;
                        }
                    }));
                }
                Err(e) if e.is_transient() && attempt < self.retry_limit => {
                    drop(permit);
                    let delay = self.backoff_delay(attempt);
                    warn!(
                        provider = slot.backend.name(),
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_millis() as u64;
        let exp = base.saturating_mul(1u64 << attempt.min(16));
        let jitter = rand::thread_rng().gen_range(0..=base.max(1) / 2);
        Duration::from_millis(exp.saturating_add(jitter))
    }

    /// Map the final failure to the caller-facing error set: no
    /// providers at all is a configuration error; an empty response
    /// passes through unwrapped; everything else is wrapped with the
    /// last underlying cause attached.
    fn escalate(last: Option<LlmError>) -> LlmError {
        match last {
            None => LlmError::Configuration("no providers configured".to_string()),
            Some(LlmError::EmptyResponse) => LlmError::EmptyResponse,
            Some(source) => LlmError::Exhausted {
                source: Box::new(source),
            },
        }
    }
}

pub struct DispatcherBuilder {
    config: DispatcherConfig,
    backends: Vec<(Arc<dyn ChatBackend>, usize)>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            config: DispatcherConfig::default(),
            backends: Vec::new(),
        }
    }

    pub fn provider(mut self, provider: ProviderConfig) -> Self {
        self.config.providers.push(provider);
        self
    }

    /// Register an already-constructed backend. Used by tests and by
    /// embedders with custom transports.
    pub fn backend(mut self, backend: Arc<dyn ChatBackend>, max_in_flight: usize) -> Self {
        self.backends.push((backend, max_in_flight));
        self
    }

    pub fn retry_limit(mut self, retry_limit: u32) -> Self {
        self.config.retry_limit = retry_limit;
        self
    }

    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.config.base_delay = base_delay;
        self
    }

    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.config.request_timeout = request_timeout;
        self
    }

    pub fn stream_timeout(mut self, stream_timeout: Duration) -> Self {
        self.config.stream_timeout = stream_timeout;
        self
    }

    pub fn build(self) -> Result<Dispatcher> {
        let mut providers = Vec::new();

        for config in &self.config.providers {
            providers.push(ProviderSlot {
                backend: Arc::new(HttpBackend::new(config)?),
                limiter: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            });
        }

        for (backend, max_in_flight) in self.backends {
            providers.push(ProviderSlot {
                backend,
                limiter: Arc::new(Semaphore::new(max_in_flight.max(1))),
            });
        }

        Ok(Dispatcher {
            providers,
            retry_limit: self.config.retry_limit,
            base_delay: self.config.base_delay,
            request_timeout: self.config.request_timeout,
            stream_timeout: self.config.stream_timeout,
        })
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
