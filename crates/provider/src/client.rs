//! HTTP client for the generation provider's REST endpoints.
//!
//! Wraps task creation, status polling, and artifact retrieval using
//! [`reqwest`]. The [`GenerationProvider`] trait lets the dispatcher
//! run against a fake in tests.

use async_trait::async_trait;
use serde::Deserialize;

use crate::status::TaskStatus;

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.genai.masterpiecex.com";

/// Errors from the provider HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("provider API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// The remote generation boundary consumed by the dispatcher.
///
/// All three calls are suspension points in the worker loop; none of
/// them touches shared scheduler state.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Submit a prompt for generation. Returns the provider-assigned
    /// task id used for all subsequent polling.
    async fn create_task(&self, prompt: &str, secret: &str) -> Result<String, ProviderError>;

    /// Poll the status of a previously created task.
    async fn task_status(
        &self,
        remote_task_id: &str,
        secret: &str,
    ) -> Result<TaskStatus, ProviderError>;

    /// Download one produced artifact by its output URL.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Response returned by `POST /v2/functions/general` after the
/// provider accepts a generation request.
#[derive(Debug, Deserialize)]
struct CreateResponse {
    /// Server-assigned identifier for the queued task.
    #[serde(rename = "requestId")]
    request_id: String,
}

/// [`GenerationProvider`] implementation talking to the real API.
pub struct HttpProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProvider {
    /// Create a client for the given API base URL, e.g.
    /// `https://api.genai.masterpiecex.com`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ProviderError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GenerationProvider for HttpProvider {
    async fn create_task(&self, prompt: &str, secret: &str) -> Result<String, ProviderError> {
        let body = serde_json::json!({ "prompt": prompt });

        let response = self
            .client
            .post(format!("{}/v2/functions/general", self.base_url))
            .bearer_auth(secret)
            .json(&body)
            .send()
            .await?;

        let created: CreateResponse = Self::parse_response(response).await?;
        Ok(created.request_id)
    }

    async fn task_status(
        &self,
        remote_task_id: &str,
        secret: &str,
    ) -> Result<TaskStatus, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v2/status/{}", self.base_url, remote_task_id))
            .bearer_auth(secret)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
