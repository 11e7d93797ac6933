//! Search-and-inject pipeline for one page load.
//!
//! ```text
//!  page ──extract──▶ title ──encode──▶ /search?q ──transport──▶ [f0, f1, ..]
//!                                                                  │
//!          ┌───────────────────────────────────────────────────────┘
//!          ▼
//!   prepend <li><a>Open in Pulp</a></li> ──click──▶ /open?f0
//! ```
//!
//! [`PageBridge`] walks the states
//! `Idle → Searching → {NoMatch | AwaitingClick → Opening}`. It searches at
//! most once and injects at most one affordance. Every failure along the way
//! ends in `NoMatch` with a log line; nothing is raised to the page.

use serde_json::Value;

use crate::companion::Companion;
use crate::config::PageConfig;
use crate::encode::encode_query;
use crate::extract::extract_citation;
use crate::models::{Affordance, BridgeState, FileMatch, SearchResult};
use crate::page::HostPage;
use crate::transport::TransportError;

/// The click handler wired to an injected affordance.
#[derive(Clone)]
pub struct Injection {
    file: FileMatch,
    companion: Companion,
}

impl Injection {
    /// The match this affordance opens.
    pub fn file_match(&self) -> &FileMatch {
        &self.file
    }

    /// Asks the companion service to open the file.
    ///
    /// Each call issues its own request. The outcome is only logged by the
    /// bridge; callers are free to ignore it.
    pub async fn click(&self) -> Result<Value, TransportError> {
        match self.companion.open(&self.file).await {
            Ok(value) => {
                tracing::info!(file = %self.file, "opened");
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(file = %self.file, error = %e, "open failed");
                Err(e)
            }
        }
    }
}

pub struct PageBridge {
    companion: Companion,
    page: PageConfig,
    state: BridgeState,
    injection: Option<Injection>,
}

impl PageBridge {
    pub fn new(companion: Companion, page: PageConfig) -> Self {
        Self {
            companion,
            page,
            state: BridgeState::Idle,
            injection: None,
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn injection(&self) -> Option<&Injection> {
        self.injection.as_ref()
    }

    /// Extracts the title, searches, and injects the affordance on a match.
    ///
    /// Only the first call does anything; later calls return the existing
    /// injection, if any.
    pub async fn run(&mut self, page: &mut dyn HostPage) -> Option<Injection> {
        if self.state != BridgeState::Idle {
            tracing::debug!(state = %self.state, "search already ran for this page");
            return self.injection.clone();
        }

        let citation = extract_citation(&*page, &self.page);
        let query = encode_query(citation.query_subject());
        self.state = BridgeState::Searching;

        match self.companion.search(&query).await {
            Ok(value) => {
                tracing::info!(response = %value, "pulp search");
                self.handle_search_result(page, &value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "pulp search failed");
                self.state = BridgeState::NoMatch;
                None
            }
        }
    }

    /// Interprets a `/search` response and mutates the page on a match.
    ///
    /// Non-arrays and empty arrays leave the page untouched. Once the bridge
    /// has left `Searching` (or injected), further responses are ignored.
    pub fn handle_search_result(
        &mut self,
        page: &mut dyn HostPage,
        value: &Value,
    ) -> Option<Injection> {
        if !matches!(self.state, BridgeState::Idle | BridgeState::Searching) {
            tracing::debug!(state = %self.state, "ignoring extra search response");
            return None;
        }

        let result = SearchResult::from_value(value);
        let Some(file) = result.first().cloned() else {
            tracing::info!("no local match");
            self.state = BridgeState::NoMatch;
            return None;
        };

        let affordance = Affordance::new(&self.page.affordance_label, &self.page.affordance_class);
        match page.prepend_affordance(&self.page.container_selector, &affordance) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    container = %self.page.container_selector,
                    "no container for the affordance"
                );
                self.state = BridgeState::NoMatch;
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not inject affordance");
                self.state = BridgeState::NoMatch;
                return None;
            }
        }

        tracing::info!(file = %file, matches = result.matches.len(), "affordance injected");
        let injection = Injection {
            file,
            companion: self.companion.clone(),
        };
        self.injection = Some(injection.clone());
        self.state = BridgeState::AwaitingClick;
        Some(injection)
    }

    /// Activates the injected affordance. `None` if nothing was injected.
    pub async fn click(&mut self) -> Option<Result<Value, TransportError>> {
        let injection = self.injection.clone()?;
        self.state = BridgeState::Opening;
        Some(injection.click().await)
    }
}
