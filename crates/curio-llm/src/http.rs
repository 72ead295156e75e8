// HTTP chat-completions backend (direct reqwest, no SDK)

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;

use crate::backend::{ChatBackend, DeltaStream};
use crate::config::ProviderConfig;
use crate::error::{LlmError, Result};
use crate::sse;
use crate::types::CompletionRequest;

/// Backend speaking the JSON chat-completions protocol: POST
/// `{base_url}/chat/completions` with bearer auth, single-body response
/// or `data:`-framed SSE when streaming.
pub struct HttpBackend {
    name: String,
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|_| {
                LlmError::Configuration(format!("invalid API key for provider {}", config.name))
            })?,
        );

        let http_client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            name: config.name.clone(),
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_payload(&self, request: &CompletionRequest, stream: bool) -> Value {
        let mut payload = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "stream": stream,
        });

        let obj = payload.as_object_mut().unwrap();

        if let Some(max_tokens) = request.options.max_tokens {
            obj.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
        }
        if let Some(temp) = request.options.temperature {
            obj.insert("temperature".to_string(), serde_json::json!(temp));
        }

        payload
    }

    async fn send(&self, payload: &Value) -> Result<reqwest::Response> {
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                provider: self.name.clone(),
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let payload = self.build_payload(request, false);
        let response = self.send(&payload).await?;

        // Read the body as text first so a malformed success body is a
        // Parse error (permanent), not a transport error (transient).
        let body = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(content)
    }

    async fn complete_stream(&self, request: &CompletionRequest) -> Result<DeltaStream> {
        let payload = self.build_payload(request, true);
        let response = self.send(&payload).await?;

        Ok(sse::delta_stream(
            response.bytes_stream().map_err(LlmError::from),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
