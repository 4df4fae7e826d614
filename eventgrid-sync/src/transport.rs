//! Transport adapter for the remote event service.
//!
//! Wraps the two remote calls and normalizes every failure into an
//! [`ErrorKind`]. There are no retries at this layer.

use async_trait::async_trait;
use eventgrid_core::{ErrorKind, Event, EventEnvelope, NewEvent};
use reqwest::StatusCode;
use std::time::Duration;

const READ_PATH: &str = "/data";
const WRITE_PATH: &str = "/events";

/// Remote calls the sync controller depends on.
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// Read the whole event collection.
    async fn fetch_collection(&self) -> Result<Vec<Event>, ErrorKind>;

    /// Create an event and return it as stored by the service.
    async fn submit_event(&self, payload: &NewEvent) -> Result<Event, ErrorKind>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportSetupError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// HTTP implementation of [`EventTransport`].
#[derive(Clone, Debug)]
pub struct RestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl RestTransport {
    /// Build a transport for `base_url` with a bounded per-request timeout.
    ///
    /// A request exceeding `timeout` fails with [`ErrorKind::Network`].
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportSetupError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(TransportSetupError::InvalidBaseUrl(base_url.to_string()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_collection(&self, url: &str) -> Result<Vec<Event>, ErrorKind> {
        let response = self.client.get(url).send().await.map_err(network_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(network_error)?;

        if !status.is_success() {
            return Err(ErrorKind::server(status.as_u16(), error_body(&body, status)));
        }

        EventEnvelope::decode(&body)
    }

    async fn create_event(&self, url: &str, payload: &NewEvent) -> Result<Event, ErrorKind> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(network_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(network_error)?;

        if status.is_success() {
            return serde_json::from_slice::<Event>(&body)
                .map_err(|e| ErrorKind::decode(e.to_string()));
        }

        let message = error_body(&body, status);
        if status.is_client_error() {
            Err(ErrorKind::validation(message))
        } else {
            Err(ErrorKind::server(status.as_u16(), message))
        }
    }
}

#[async_trait]
impl EventTransport for RestTransport {
    async fn fetch_collection(&self) -> Result<Vec<Event>, ErrorKind> {
        let url = self.url(READ_PATH);
        let result = self.read_collection(&url).await;
        match &result {
            Ok(events) => tracing::debug!(url = %url, count = events.len(), "fetched events"),
            Err(err) => tracing::warn!(url = %url, error = %err, "event fetch failed"),
        }
        result
    }

    async fn submit_event(&self, payload: &NewEvent) -> Result<Event, ErrorKind> {
        let url = self.url(WRITE_PATH);
        let result = self.create_event(&url, payload).await;
        if let Err(err) = &result {
            tracing::warn!(url = %url, error = %err, "event submit failed");
        }
        result
    }
}

fn network_error(err: reqwest::Error) -> ErrorKind {
    if err.is_timeout() {
        ErrorKind::network(format!("request timed out: {}", err))
    } else {
        ErrorKind::network(err.to_string())
    }
}

/// The response body verbatim, or the status reason when the body is empty.
fn error_body(body: &[u8], status: StatusCode) -> String {
    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        text.into_owned()
    }
}
