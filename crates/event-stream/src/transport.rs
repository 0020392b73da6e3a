//! Delivery transports for the event forwarder.

use async_trait::async_trait;

/// Errors reported by an event transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(String),
    #[error("stream gateway answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport closed")]
    Closed,
}

/// Delivers a single encoded event to a stream topic.
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// Sends `payload` to `topic`.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` if delivery fails; the forwarder decides
    /// whether to retry.
    async fn send(&self, topic: &str, payload: &serde_json::Value) -> Result<(), TransportError>;
}

/// HTTP transport posting events to a stream gateway.
///
/// Events land at `<base_url>/topics/<topic>` as a JSON body.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl EventTransport for HttpTransport {
    async fn send(&self, topic: &str, payload: &serde_json::Value) -> Result<(), TransportError> {
        let url = format!("{}/topics/{}", self.base_url, topic);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Transport that only logs events. Used when no stream gateway is
/// configured, keeping the publishing path exercised in development.
pub struct LogTransport;

#[async_trait]
impl EventTransport for LogTransport {
    async fn send(&self, topic: &str, payload: &serde_json::Value) -> Result<(), TransportError> {
        tracing::info!(topic, %payload, "patient event");
        Ok(())
    }
}
