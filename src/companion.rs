//! Companion service endpoints.
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `GET`  | `/search?<encoded title>` | JSON array of file matches |
//! | `GET`  | `/open?<file match>` | ignored; opens the file on the service side |
//! | `GET`  | `/list` | JSON array of library entries |
//! | `GET`  | `/short_list` | JSON array of `[title regex, file name]` pairs |
//! | `GET`  | `/view?<path>` | ignored; shows a file on the service side |
//!
//! The query string is appended raw: callers pass an already encoded title
//! to [`Companion::search`], and file matches are echoed back verbatim.

use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::models::FileMatch;
use crate::transport::{create_transport, Transport, TransportError};

/// Client for the companion service, over whichever transport was configured.
#[derive(Clone)]
pub struct Companion {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl Companion {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// Builds the configured transport and points it at `service.base_url`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = create_transport(config)?;
        Ok(Self::new(config.service.base(), transport))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn search_url(&self, encoded_query: &str) -> String {
        format!("{}/search?{}", self.base_url, encoded_query)
    }

    pub fn open_url(&self, file: &FileMatch) -> String {
        format!("{}/open?{}", self.base_url, file.as_str())
    }

    pub fn list_url(&self) -> String {
        format!("{}/list", self.base_url)
    }

    pub fn short_list_url(&self) -> String {
        format!("{}/short_list", self.base_url)
    }

    /// `path` is appended verbatim, like a file match on `open`.
    pub fn view_url(&self, path: &str) -> String {
        format!("{}/view?{}", self.base_url, path)
    }

    pub async fn search(&self, encoded_query: &str) -> Result<Value, TransportError> {
        self.transport.issue(&self.search_url(encoded_query)).await
    }

    pub async fn open(&self, file: &FileMatch) -> Result<Value, TransportError> {
        self.transport.issue(&self.open_url(file)).await
    }

    pub async fn list(&self) -> Result<Value, TransportError> {
        self.transport.issue(&self.list_url()).await
    }

    pub async fn short_list(&self) -> Result<Value, TransportError> {
        self.transport.issue(&self.short_list_url()).await
    }

    pub async fn view(&self, path: &str) -> Result<Value, TransportError> {
        self.transport.issue(&self.view_url(path)).await
    }
}
