//! OneSignal REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ProviderConfig;

use super::payload::NotificationPayload;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Errors that can occur when calling the provider.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No response within the request timeout
    #[error("Provider request timed out")]
    Timeout,

    /// Connection or I/O failure
    #[error("Network error: {0}")]
    Network(String),

    /// Provider answered with a non-success status
    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The request could not be built (bad URL, invalid header value)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Timeout | TransportError::Network(_) => true,
            TransportError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            TransportError::InvalidRequest(_) => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Body of a successful `POST /notifications` call.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProviderReply {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub recipients: Option<u64>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub status: u16,
    pub reply: ProviderReply,
}

/// Delivery channel to the push provider.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// POST a notification. Only 2xx answers are returned as `Ok`.
    async fn send(&self, rest_key: &str, payload: &NotificationPayload) -> Result<ProviderResponse, TransportError>;
}

/// HTTPS transport to the OneSignal notifications endpoint.
///
/// Certificates are verified (rustls with webpki roots) and every request is
/// bounded by the configured timeout.
pub struct OneSignalClient {
    client: Client,
    endpoint: String,
}

impl OneSignalClient {
    pub fn new(provider: &ProviderConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(provider.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(provider.request_timeout_seconds.min(5)))
            .build()?;

        Ok(Self {
            client,
            endpoint: provider.api_url.clone(),
        })
    }
}

#[async_trait]
impl PushTransport for OneSignalClient {
    async fn send(&self, rest_key: &str, payload: &NotificationPayload) -> Result<ProviderResponse, TransportError> {
        // The key goes out raw after "Basic", not base64 encoded
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(AUTHORIZATION, format!("Basic {}", rest_key))
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        if !(200..300).contains(&status) {
            return Err(TransportError::Status { status, body });
        }

        let reply = serde_json::from_str::<ProviderReply>(&body).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Unparseable provider reply");
            ProviderReply::default()
        });

        Ok(ProviderResponse { status, reply })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TransportError::Timeout.is_retryable());
        assert!(TransportError::Network("reset".into()).is_retryable());
        assert!(TransportError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(TransportError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(!TransportError::Status { status: 400, body: String::new() }.is_retryable());
        assert!(!TransportError::Status { status: 401, body: String::new() }.is_retryable());
        assert!(!TransportError::InvalidRequest("bad header".into()).is_retryable());
    }

    #[test]
    fn test_reply_parsing_is_lenient() {
        let reply: ProviderReply =
            serde_json::from_str(r#"{"id":"b98881cc","recipients":3,"external_id":null}"#).unwrap();
        assert_eq!(reply.id.as_deref(), Some("b98881cc"));
        assert_eq!(reply.recipients, Some(3));

        let reply: ProviderReply =
            serde_json::from_str(r#"{"id":"","recipients":0,"errors":["All included players are not subscribed"]}"#)
                .unwrap();
        assert!(reply.errors.is_some());
    }
}
