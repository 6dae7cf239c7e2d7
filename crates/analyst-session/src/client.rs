//! HTTP client for the analyst API.

use analyst_core::{async_trait, ByteStream, ChatMessage, UpstreamError};
use futures::TryStreamExt;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::service::AnalystService;

#[derive(Debug, Serialize)]
struct AnalystRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Debug, Serialize)]
struct TitleRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct TitleResponse {
    title: String,
}

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the analyst API endpoints.
#[derive(Debug, Clone)]
pub struct AnalystClient {
    http: Client,
    config: SessionConfig,
}

impl AnalystClient {
    /// Create a new client.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let http = Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| SessionError::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!("AnalystClient targeting {}", config.api_url);

        Ok(Self { http, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, UpstreamError> {
        let url = self.config.endpoint(path);
        debug!("POST {}", url);

        let pending = self.http.post(&url).json(body).send();
        let response = tokio::time::timeout(self.config.timeout, pending)
            .await
            .map_err(|_| {
                UpstreamError::Network(format!(
                    "no response from {} within {}s",
                    path,
                    self.config.timeout.as_secs()
                ))
            })?
            .map_err(|e| UpstreamError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);

        warn!(status = status.as_u16(), path, "Analyst API error: {}", detail);
        Err(UpstreamError::from_status(status.as_u16(), detail))
    }
}

#[async_trait]
impl AnalystService for AnalystClient {
    async fn stream_reply(&self, history: &[ChatMessage]) -> Result<ByteStream, UpstreamError> {
        let response = self
            .post("/ai-analyst", &AnalystRequest { messages: history })
            .await?;

        let body = response
            .bytes_stream()
            .map_err(|e| UpstreamError::Network(format!("stream read failed: {}", e)));

        Ok(Box::pin(body))
    }

    async fn generate_title(&self, message: &str) -> Result<String, UpstreamError> {
        let response = self
            .post("/generate-title", &TitleRequest { message })
            .await?;

        let body: TitleResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(format!("title response: {}", e)))?;

        Ok(body.title)
    }
}
