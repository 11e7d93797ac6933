//! CLI command drivers.
//!
//! `augment` runs the whole bridge against a saved page or a live URL;
//! `search`, `open`, `view`, `list`, `short-list` and `encode` exercise
//! single steps, which is
//! handy for checking that the companion service is up.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::bridge::PageBridge;
use crate::companion::Companion;
use crate::config::Config;
use crate::encode::encode_query;
use crate::models::{FileMatch, SearchResult};
use crate::page::HtmlPage;
use crate::transport::build_client;

/// Where the page to augment comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    File(PathBuf),
    Url(String),
}

impl PageSource {
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            PageSource::Url(source.to_string())
        } else {
            PageSource::File(PathBuf::from(source))
        }
    }

    pub async fn load(&self, config: &Config) -> Result<HtmlPage> {
        match self {
            PageSource::File(path) => HtmlPage::from_file(path),
            PageSource::Url(url) => {
                let client = build_client(&config.service)?;
                HtmlPage::fetch(&client, url).await
            }
        }
    }
}

/// Runs extract → search → inject (→ click) and writes the resulting HTML.
///
/// Transport problems never fail the command: the page is written back
/// unaugmented, matching what a reader of the page would see.
pub async fn run_augment(
    config: &Config,
    source: &str,
    click: bool,
    output: Option<&Path>,
) -> Result<()> {
    let mut page = PageSource::parse(source).load(config).await?;
    let companion = Companion::from_config(config)?;
    tracing::debug!(
        strategy = %companion.transport().strategy(),
        base_url = companion.base_url(),
        "augmenting page"
    );

    let mut bridge = PageBridge::new(companion, config.page.clone());
    bridge.run(&mut page).await;

    if click {
        // Outcome is already logged by the click handler.
        if bridge.click().await.is_none() {
            tracing::info!("nothing to click");
        }
    }
    eprintln!("state: {}", bridge.state());

    let html = page.render();
    match output {
        Some(path) => std::fs::write(path, html)
            .with_context(|| format!("Failed to write output: {}", path.display()))?,
        None => println!("{}", html),
    }
    Ok(())
}

/// Prints the matches for a title, one per line.
pub async fn run_search(config: &Config, title: &str) -> Result<()> {
    let companion = Companion::from_config(config)?;
    let value = companion.search(&encode_query(title)).await?;
    let result = SearchResult::from_value(&value);

    if result.is_empty() {
        println!("No matches.");
        return Ok(());
    }
    for file in &result.matches {
        println!("{}", file);
    }
    Ok(())
}

pub async fn run_open(config: &Config, file: &str) -> Result<()> {
    let companion = Companion::from_config(config)?;
    let file = FileMatch::new(file);
    companion.open(&file).await?;
    println!("Opened: {}", file);
    Ok(())
}

pub async fn run_list(config: &Config) -> Result<()> {
    let companion = Companion::from_config(config)?;
    let value = companion.list().await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

pub async fn run_short_list(config: &Config) -> Result<()> {
    let companion = Companion::from_config(config)?;
    let value = companion.short_list().await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

pub async fn run_view(config: &Config, path: &str) -> Result<()> {
    let companion = Companion::from_config(config)?;
    companion.view(path).await?;
    println!("Viewing: {}", path);
    Ok(())
}

pub fn run_encode(title: &str) {
    println!("{}", encode_query(title));
}
