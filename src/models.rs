//! Core data types shared across the bridge.

use serde_json::Value;

/// Bibliographic metadata read off the hosted page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Citation {
    pub title: Option<String>,
}

impl Citation {
    /// The title, or `""` when the page carries no title descriptor.
    pub fn query_subject(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

/// Opaque identifier of a local file known to the companion service.
///
/// Echoed back verbatim on `open`; never parsed, decoded or validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatch(String);

impl FileMatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strings are taken verbatim; any other JSON scalar by its JSON text.
    fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self(s.clone()),
            other => Self(other.to_string()),
        }
    }
}

impl std::fmt::Display for FileMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered matches as returned by the companion service's `/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub matches: Vec<FileMatch>,
}

impl SearchResult {
    /// Interprets a parsed `/search` response.
    ///
    /// Anything that is not a JSON array is an empty result.
    pub fn from_value(value: &Value) -> Self {
        let matches = value
            .as_array()
            .map(|items| items.iter().map(FileMatch::from_value).collect())
            .unwrap_or_default();
        Self { matches }
    }

    /// The selected match under the first-match policy.
    pub fn first(&self) -> Option<&FileMatch> {
        self.matches.first()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// The link injected into the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordance {
    pub label: String,
    pub class: String,
    pub href: String,
}

impl Affordance {
    pub fn new(label: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            class: class.into(),
            href: "#".to_string(),
        }
    }

    /// `<li><a class=".." href="#">label</a></li>`, with text and attributes escaped.
    pub fn to_markup(&self) -> String {
        format!(
            "<li><a class=\"{}\" href=\"{}\">{}</a></li>",
            escape_html(&self.class),
            escape_html(&self.href),
            escape_html(&self.label)
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Lifecycle of the bridge for a single page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Idle,
    Searching,
    /// Terminal: nothing was injected.
    NoMatch,
    AwaitingClick,
    /// Entered on every click; clicking again re-issues `open`.
    Opening,
}

impl std::fmt::Display for BridgeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BridgeState::Idle => "idle",
            BridgeState::Searching => "searching",
            BridgeState::NoMatch => "no_match",
            BridgeState::AwaitingClick => "awaiting_click",
            BridgeState::Opening => "opening",
        };
        f.write_str(s)
    }
}
