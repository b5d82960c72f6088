//! API client: the single point of entry for all calls to the job-portal REST API.
//!
//! Every endpoint answers with the same envelope: `{status, data, message?}`.
//! A `status` of `"success"` is the only success marker; anything else is a
//! business-logic failure that callers inspect through [`ApiEnvelope::is_success`].
//! Non-2xx HTTP statuses and transport problems surface as [`ApiError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod endpoints;

pub use endpoints::Endpoint;

/// Literal status value the server uses to mark a successful call.
pub const SUCCESS_STATUS: &str = "success";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status code {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Rejected(String),
}

/// Response envelope shared by every endpoint of the mobile API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiEnvelope {
    pub fn success(data: Value) -> Self {
        Self {
            status: SUCCESS_STATUS.to_string(),
            data,
            message: None,
        }
    }

    pub fn failure(message: Option<&str>) -> Self {
        Self {
            status: "error".to_string(),
            data: Value::Null,
            message: message.map(str::to_string),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// Converts a business-logic failure into an error, keeping the payload on success.
    pub fn into_result(self, fallback: impl FnOnce() -> String) -> Result<Value, ApiError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(ApiError::Rejected(
                self.message.filter(|m| !m.is_empty()).unwrap_or_else(fallback),
            ))
        }
    }
}

/// The REST operations the rest of the client depends on.
/// Carried as `Arc<dyn ProfileApi>` so tests can swap in a scripted backend.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    async fn get(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
    ) -> Result<ApiEnvelope, ApiError>;

    async fn delete(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
    ) -> Result<ApiEnvelope, ApiError>;
}

/// reqwest-backed client bound to one API base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn url(&self, endpoint: Endpoint) -> String {
        endpoint.url(self.base_url.as_str())
    }

    async fn read_envelope(
        endpoint: Endpoint,
        response: reqwest::Response,
    ) -> Result<ApiEnvelope, ApiError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} returned {}: {}", endpoint.path(), status, body);
            // Prefer the server's own message when the error body is an envelope
            let message = serde_json::from_str::<ApiEnvelope>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiEnvelope = response.json().await?;
        debug!("{} answered status={:?}", endpoint.path(), envelope.status);
        Ok(envelope)
    }
}

#[async_trait]
impl ProfileApi for ApiClient {
    async fn get(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
    ) -> Result<ApiEnvelope, ApiError> {
        let response = self
            .client
            .get(self.url(endpoint))
            .query(params)
            .send()
            .await?;
        Self::read_envelope(endpoint, response).await
    }

    async fn delete(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
    ) -> Result<ApiEnvelope, ApiError> {
        let response = self
            .client
            .delete(self.url(endpoint))
            .query(params)
            .send()
            .await?;
        Self::read_envelope(endpoint, response).await
    }
}
