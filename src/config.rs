//! TOML configuration.
//!
//! Every section has defaults, so an empty file (or no file at all) yields a
//! configuration that talks to the companion service on
//! `http://localhost:23232` using the direct transport and arXiv's page
//! structure.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Default companion service origin.
pub const DEFAULT_BASE_URL: &str = "http://localhost:23232";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout handed to the underlying HTTP client. `None` leaves requests
    /// unbounded.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Which execution context performs the network request.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportStrategy {
    /// Request issued from the calling task.
    #[default]
    Direct,
    /// Request delegated to the privileged relay context.
    Relay,
}

impl std::fmt::Display for TransportStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportStrategy::Direct => write!(f, "direct"),
            TransportStrategy::Relay => write!(f, "relay"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    #[serde(default)]
    pub strategy: TransportStrategy,
    #[serde(default = "default_relay_buffer")]
    pub relay_buffer: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            strategy: TransportStrategy::Direct,
            relay_buffer: default_relay_buffer(),
        }
    }
}

fn default_relay_buffer() -> usize {
    16
}

/// Selectors and texts describing the hosted page.
#[derive(Debug, Deserialize, Clone)]
pub struct PageConfig {
    #[serde(default = "default_title_selector")]
    pub title_selector: String,
    #[serde(default = "default_title_attribute")]
    pub title_attribute: String,
    #[serde(default = "default_container_selector")]
    pub container_selector: String,
    #[serde(default = "default_affordance_label")]
    pub affordance_label: String,
    #[serde(default = "default_affordance_class")]
    pub affordance_class: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title_selector: default_title_selector(),
            title_attribute: default_title_attribute(),
            container_selector: default_container_selector(),
            affordance_label: default_affordance_label(),
            affordance_class: default_affordance_class(),
        }
    }
}

fn default_title_selector() -> String {
    "meta[name=citation_title]".to_string()
}
fn default_title_attribute() -> String {
    "content".to_string()
}
fn default_container_selector() -> String {
    ".full-text ul".to_string()
}
fn default_affordance_label() -> String {
    "Open in Pulp".to_string()
}
fn default_affordance_class() -> String {
    "open_in_pulp".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServiceConfig {
    /// Base URL without a trailing slash, ready for `"{base}/search?..."`.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?;
    Ok(config)
}

/// Parses and validates configuration text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    // Validate service
    let url = reqwest::Url::parse(&config.service.base_url)
        .with_context(|| format!("service.base_url is not a URL: '{}'", config.service.base_url))?;
    match url.scheme() {
        "http" | "https" => {}
        other => bail!(
            "service.base_url must use http or https, got '{}'",
            other
        ),
    }
    if url.query().is_some() {
        bail!("service.base_url must not carry a query string");
    }
    if config.service.timeout_secs == Some(0) {
        bail!("service.timeout_secs must be > 0 when set");
    }

    // Validate transport
    if config.transport.relay_buffer == 0 {
        bail!("transport.relay_buffer must be > 0");
    }

    // Validate page
    let page = &config.page;
    for (field, selector) in [
        ("page.title_selector", &page.title_selector),
        ("page.container_selector", &page.container_selector),
    ] {
        if scraper::Selector::parse(selector).is_err() {
            bail!("{} is not a valid CSS selector: '{}'", field, selector);
        }
    }
    if page.title_attribute.trim().is_empty() {
        bail!("page.title_attribute must not be empty");
    }
    if page.affordance_label.trim().is_empty() {
        bail!("page.affordance_label must not be empty");
    }
    if !is_class_token(&page.affordance_class) {
        bail!(
            "page.affordance_class must be a single CSS class name, got '{}'",
            page.affordance_class
        );
    }

    Ok(())
}

fn is_class_token(class: &str) -> bool {
    let mut chars = class.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '-' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
