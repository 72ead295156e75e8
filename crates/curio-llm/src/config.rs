// Configuration for the dispatcher and its ordered provider list.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

fn default_max_in_flight() -> usize {
    2
}

/// One provider endpoint. Providers share the same wire shape and differ
/// only in endpoint, credential and concurrency allowance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub base_url: String,
    pub api_key: String,
    /// Requests allowed in flight against this provider at once.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl ProviderConfig {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            max_in_flight: default_max_in_flight(),
        }
    }

    /// OpenAI provider config with the standard API base URL.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", OPENAI_API_BASE, api_key)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }
}

/// Dispatcher-wide settings. Providers are tried in order: the first is
/// the primary, the rest are fallbacks.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub providers: Vec<ProviderConfig>,
    /// Additional attempts after the first, per provider.
    pub retry_limit: u32,
    pub base_delay: Duration,
    pub request_timeout: Duration,
    pub stream_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            retry_limit: 3,
            base_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
            stream_timeout: Duration::from_secs(60),
        }
    }
}

impl DispatcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(mut self, provider: ProviderConfig) -> Self {
        self.providers.push(provider);
        self
    }
}
