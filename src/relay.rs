//! Privileged relay context.
//!
//! A caller that may not reach the companion service itself sends a
//! [`RelayMessage`] to a [`RelayContext`] task, which performs the fetch with
//! its own HTTP client and replies with the raw response text. The reply
//! travels back on a per-request `oneshot` channel; parsing stays with the
//! caller (see [`RelayTransport`](crate::transport::RelayTransport)).
//!
//! # Message shape
//!
//! ```json
//! { "method": "GET", "action": "xhttp", "url": "http://localhost:23232/search?...", "data": "" }
//! ```
//!
//! Only `GET` + `xhttp` is served; anything else is answered with
//! [`TransportError::Relay`].

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::transport::{fetch_text, TransportError};

/// The one action the relay understands: a cross-context fetch.
pub const ACTION_XHTTP: &str = "xhttp";

/// Request sent across the context boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMessage {
    pub method: String,
    pub action: String,
    pub url: String,
    /// Request body; unused for GET.
    #[serde(default)]
    pub data: String,
}

impl RelayMessage {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            action: ACTION_XHTTP.to_string(),
            url: url.into(),
            data: String::new(),
        }
    }
}

/// A message paired with the channel its reply goes back on.
#[derive(Debug)]
pub struct RelayRequest {
    pub message: RelayMessage,
    pub reply: oneshot::Sender<Result<String, TransportError>>,
}

/// The privileged side: owns the HTTP client and serves relayed fetches.
#[derive(Clone)]
pub struct RelayContext {
    client: reqwest::Client,
}

impl RelayContext {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Starts serving on the current runtime.
    ///
    /// Returns the sending half for callers and the serving task, which ends
    /// when every sender has been dropped.
    pub fn spawn(self, buffer: usize) -> (mpsc::Sender<RelayRequest>, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(buffer);
        let task = tokio::spawn(self.serve(receiver));
        (sender, task)
    }

    async fn serve(self, mut receiver: mpsc::Receiver<RelayRequest>) {
        while let Some(request) = receiver.recv().await {
            let context = self.clone();
            // One task per fetch so a slow request does not hold up the channel.
            tokio::spawn(async move {
                let RelayRequest { message, reply } = request;
                let result = context.handle(&message).await;
                if reply.send(result).is_err() {
                    tracing::debug!(url = %message.url, "relay caller went away before the reply");
                }
            });
        }
        tracing::debug!("relay context stopped");
    }

    /// Performs the fetch a message asks for and returns the raw body.
    pub async fn handle(&self, message: &RelayMessage) -> Result<String, TransportError> {
        if message.action != ACTION_XHTTP {
            return Err(TransportError::Relay(format!(
                "unknown action: {}",
                message.action
            )));
        }
        if !message.method.eq_ignore_ascii_case("GET") {
            return Err(TransportError::Relay(format!(
                "unsupported method: {}",
                message.method
            )));
        }

        tracing::debug!(url = %message.url, "relay fetch");
        fetch_text(&self.client, &message.url).await
    }
}
