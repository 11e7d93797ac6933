//! In-process stand-in for the Pulp companion service.

#![allow(dead_code)]

use axum::{
    extract::{RawQuery, State},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MockCompanion {
    /// Raw query string → `/search` response.
    library: Arc<HashMap<String, Value>>,
    pub searches: Arc<Mutex<Vec<String>>>,
    pub opens: Arc<Mutex<Vec<String>>>,
    pub views: Arc<Mutex<Vec<String>>>,
}

impl MockCompanion {
    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn opens(&self) -> Vec<String> {
        self.opens.lock().unwrap().clone()
    }

    pub fn views(&self) -> Vec<String> {
        self.views.lock().unwrap().clone()
    }
}

async fn search(State(state): State<MockCompanion>, RawQuery(query): RawQuery) -> String {
    let query = query.unwrap_or_default();
    state.searches.lock().unwrap().push(query.clone());
    let matches = state.library.get(&query).cloned().unwrap_or(json!([]));
    // The real service pretty-prints with a two-space indent.
    serde_json::to_string_pretty(&matches).unwrap()
}

async fn open(State(state): State<MockCompanion>, RawQuery(query): RawQuery) -> String {
    state.opens.lock().unwrap().push(query.unwrap_or_default());
    String::new()
}

async fn view(State(state): State<MockCompanion>, RawQuery(query): RawQuery) -> String {
    state.views.lock().unwrap().push(query.unwrap_or_default());
    String::new()
}

async fn short_list() -> String {
    json!([["attention is all you need", "Vaswani_2017_Attention_Is_All_You_Need.pdf"]])
        .to_string()
}

async fn list() -> String {
    json!([
        {
            "authors": ["Vaswani"],
            "year": "2017",
            "title": "Attention Is All You Need",
            "file_name": "Vaswani_2017_Attention_Is_All_You_Need.pdf"
        }
    ])
    .to_string()
}

async fn not_json() -> &'static str {
    "<html><body>Internal error</body></html>"
}

/// Starts the mock on an ephemeral port. Returns its base URL.
pub async fn start_companion(library: &[(&str, Value)]) -> (String, MockCompanion) {
    let state = MockCompanion {
        library: Arc::new(
            library
                .iter()
                .map(|(q, v)| (q.to_string(), v.clone()))
                .collect(),
        ),
        ..MockCompanion::default()
    };

    let app = Router::new()
        .route("/search", get(search))
        .route("/open", get(open))
        .route("/view", get(view))
        .route("/list", get(list))
        .route("/short_list", get(short_list))
        .route("/not-json", get(not_json))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (format!("http://{}", addr), state)
}

/// A base URL nothing listens on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub const ATTENTION_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en"><head>
<title>[1706.03762] Attention Is All You Need</title>
<meta name="citation_title" content="Attention Is All You Need" />
<meta name="citation_author" content="Vaswani, Ashish" />
</head><body>
<div class="extra-services">
  <div class="full-text">
    <h2>Access Paper:</h2>
    <ul>
      <li><a href="/pdf/1706.03762" class="abs-button download-pdf">View PDF</a></li>
      <li><a href="/format/1706.03762" class="abs-button download-format">Other Formats</a></li>
    </ul>
  </div>
</div>
</body></html>"#;

pub const OBSCURE_PAGE: &str = r#"<html><head>
<meta name="citation_title" content="Obscure Paper" />
</head><body>
<div class="full-text"><ul><li><a href="/pdf/0000.00000">View PDF</a></li></ul></div>
</body></html>"#;

pub const UNTITLED_PAGE: &str = r#"<html><head><title>No metadata</title></head><body>
<div class="full-text"><ul><li><a href="/pdf/0000.00001">View PDF</a></li></ul></div>
</body></html>"#;
