//! Gateway client implementing [`ChatCompletions`].

use analyst_core::{async_trait, ByteStream, ChatCompletions, ChatMessage, UpstreamError};
use futures::TryStreamExt;
use reqwest::{Client, Response};
use tracing::{debug, info, warn};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse};
use crate::config::GatewayConfig;

/// Chat-completion client for an OpenAI-compatible gateway.
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, UpstreamError> {
        if config.api_key.trim().is_empty() {
            return Err(UpstreamError::Configuration(
                "gateway API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| {
                UpstreamError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            "GatewayClient initialized with model: {}, url: {}",
            config.model, config.api_url
        );

        Ok(Self { client, config })
    }

    /// Create a client from environment variables.
    ///
    /// See [`GatewayConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, UpstreamError> {
        Self::new(GatewayConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Post a completion request and wait for the response headers.
    async fn send(&self, request: &ChatCompletionRequest<'_>) -> Result<Response, UpstreamError> {
        let url = self.config.completions_url();

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            stream = request.stream,
            "Sending request to gateway"
        );

        let pending = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send();

        let response = tokio::time::timeout(self.config.timeout, pending)
            .await
            .map_err(|_| {
                UpstreamError::Network(format!(
                    "no response within {}s",
                    self.config.timeout.as_secs()
                ))
            })?
            .map_err(|e| UpstreamError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiError>(&error_text)
            .map(|api_error| api_error.error.message)
            .unwrap_or(error_text);

        warn!(status = status.as_u16(), "Gateway returned error: {}", detail);
        Err(UpstreamError::from_status(status.as_u16(), detail))
    }
}

#[async_trait]
impl ChatCompletions for GatewayClient {
    async fn stream(&self, messages: Vec<ChatMessage>) -> Result<ByteStream, UpstreamError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: &messages,
            stream: true,
            max_tokens: None,
        };

        let response = self.send(&request).await?;

        let body = response
            .bytes_stream()
            .map_err(|e| UpstreamError::Network(format!("stream read failed: {}", e)));

        Ok(Box::pin(body))
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: Option<u32>,
    ) -> Result<String, UpstreamError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: &messages,
            stream: false,
            max_tokens,
        };

        let response = self.send(&request).await?;

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            UpstreamError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        let content = completion.first_content().unwrap_or_default().to_string();
        debug!(chars = content.len(), "Received completion from gateway");

        Ok(content)
    }

    fn name(&self) -> &str {
        "GatewayClient"
    }
}
