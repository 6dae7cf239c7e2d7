//! Configuration for the gateway client.

use analyst_core::UpstreamError;
use std::env;
use std::time::Duration;

/// Default gateway base URL.
pub const DEFAULT_API_URL: &str = "https://ai.gateway.lovable.dev";

/// Default model.
pub const DEFAULT_MODEL: &str = "google/gemini-3-flash-preview";

/// Default time allowed for connecting and receiving response headers.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for [`GatewayClient`](crate::GatewayClient).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Gateway base URL, without the `/v1/...` path.
    pub api_url: String,

    /// Bearer token for the gateway.
    pub api_key: String,

    /// Model name to request.
    pub model: String,

    /// Deadline for connect plus response headers. The streamed body is
    /// not bounded by it.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GatewayConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `GATEWAY_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `GATEWAY_API_URL` - Base URL (default: https://ai.gateway.lovable.dev)
    /// - `GATEWAY_MODEL` - Model name (default: google/gemini-3-flash-preview)
    /// - `GATEWAY_TIMEOUT_SECS` - Connect and first-byte timeout (default: 60)
    pub fn from_env() -> Result<Self, UpstreamError> {
        let api_key = env::var("GATEWAY_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| UpstreamError::Configuration("GATEWAY_API_KEY not set".to_string()))?;

        let api_url = env::var("GATEWAY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let model = env::var("GATEWAY_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = env::var("GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            api_url,
            api_key,
            model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Create a new config builder.
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.api_url.trim_end_matches('/'))
    }
}

/// Builder for GatewayConfig.
#[derive(Debug, Default)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the connect and first-byte timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GatewayConfig {
        self.config
    }
}
