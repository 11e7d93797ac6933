//! Transport abstraction for reaching the companion service.
//!
//! Defines the [`Transport`] trait and its two strategies:
//! - **[`DirectTransport`]**: issues the GET from the calling task.
//! - **[`RelayTransport`]**: hands the request to the privileged
//!   [`RelayContext`](crate::relay::RelayContext) over a message channel and
//!   parses the raw text it replies with.
//!
//! Both strategies fetch through [`fetch_text`] and parse through
//! [`parse_body`], so the same service response yields the same JSON value
//! whichever strategy is configured.
//!
//! # Provider Selection
//!
//! Use [`create_transport`] to build the strategy named in the configuration:
//!
//! ```rust,no_run
//! # use pulp_bridge::config::Config;
//! # use pulp_bridge::transport::create_transport;
//! # async fn example() -> anyhow::Result<()> {
//! let transport = create_transport(&Config::default())?;
//! let value = transport.issue("http://localhost:23232/search?Attention").await?;
//! # Ok(())
//! # }
//! ```
//!
//! No retries and no timeout are applied here; `service.timeout_secs` only
//! configures the HTTP client underneath.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use crate::config::{Config, ServiceConfig, TransportStrategy};
use crate::relay::{RelayContext, RelayMessage, RelayRequest};

/// Why a request produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection refused, DNS failure, timeout, or an unreadable body.
    Request(String),
    /// The service answered with a non-success status.
    Status(u16),
    /// The relay context rejected the message or went away.
    Relay(String),
    /// The body is not JSON.
    Malformed(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Request(e) => write!(f, "request failed: {}", e),
            TransportError::Status(code) => write!(f, "service returned HTTP {}", code),
            TransportError::Relay(e) => write!(f, "relay failed: {}", e),
            TransportError::Malformed(e) => write!(f, "malformed response: {}", e),
        }
    }
}

impl std::error::Error for TransportError {}

/// Issues a GET against the companion service and yields the parsed body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Which execution context performs the request.
    fn strategy(&self) -> TransportStrategy;

    /// Fetches `url` and parses the body as JSON.
    ///
    /// Resolves exactly once per call.
    async fn issue(&self, url: &str) -> Result<Value, TransportError>;
}

/// Builds the HTTP client used by both strategies.
pub fn build_client(service: &ServiceConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = service.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// Instantiates the strategy selected by `transport.strategy`.
///
/// The relay strategy spawns its [`RelayContext`] on the current tokio
/// runtime; the context shuts down once every handle to it is dropped.
pub fn create_transport(config: &Config) -> Result<Arc<dyn Transport>> {
    if config.transport.strategy == TransportStrategy::Relay
        && config.transport.relay_buffer == 0
    {
        bail!("transport.relay_buffer must be > 0");
    }
    let client = build_client(&config.service)?;
    let transport: Arc<dyn Transport> = match config.transport.strategy {
        TransportStrategy::Direct => Arc::new(DirectTransport::new(client)),
        TransportStrategy::Relay => {
            let (sender, _task) = RelayContext::new(client).spawn(config.transport.relay_buffer);
            Arc::new(RelayTransport::new(sender))
        }
    };
    Ok(transport)
}

/// GETs `url` and returns the raw body text.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, TransportError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| TransportError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status(status.as_u16()));
    }

    response
        .text()
        .await
        .map_err(|e| TransportError::Request(e.to_string()))
}

/// Parses a response body as JSON.
///
/// A body that is empty (or only whitespace) reads as `null`: the companion
/// service answers `/open` with no body at all.
pub fn parse_body(text: &str) -> Result<Value, TransportError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| TransportError::Malformed(e.to_string()))
}

// ============ Direct ============

/// Requests issued straight from the calling task.
pub struct DirectTransport {
    client: reqwest::Client,
}

impl DirectTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for DirectTransport {
    fn strategy(&self) -> TransportStrategy {
        TransportStrategy::Direct
    }

    async fn issue(&self, url: &str) -> Result<Value, TransportError> {
        tracing::debug!(url, "direct request");
        let text = fetch_text(&self.client, url).await?;
        parse_body(&text)
    }
}

// ============ Relay ============

/// Requests delegated to a [`RelayContext`] over its message channel.
#[derive(Clone)]
pub struct RelayTransport {
    sender: mpsc::Sender<RelayRequest>,
}

impl RelayTransport {
    pub fn new(sender: mpsc::Sender<RelayRequest>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Transport for RelayTransport {
    fn strategy(&self) -> TransportStrategy {
        TransportStrategy::Relay
    }

    async fn issue(&self, url: &str) -> Result<Value, TransportError> {
        let message = RelayMessage::get(url);
        tracing::debug!(?message, "relaying request");

        let (reply, response) = oneshot::channel();
        self.sender
            .send(RelayRequest { message, reply })
            .await
            .map_err(|_| TransportError::Relay("relay context is not running".to_string()))?;

        let text = response
            .await
            .map_err(|_| TransportError::Relay("relay context dropped the reply".to_string()))??;
        parse_body(&text)
    }
}
