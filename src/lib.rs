//! # Pulp Bridge
//!
//! Connects citation pages to a local Pulp companion service.
//!
//! Given a paper's landing page (arXiv-style, with a
//! `<meta name="citation_title">` descriptor), the bridge asks the companion
//! service on `http://localhost:23232` whether a local copy exists and, if it
//! does, prepends an "Open in Pulp" link to the page's full-text list.
//! Clicking the link asks the service to open the file.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────┐   ┌──────────────────────┐   ┌──────────────┐
//! │  extract  │──▶│  encode  │──▶│      transport       │──▶│    bridge    │
//! │ meta tag  │   │ %-encode │   │ direct │ relay ctx   │   │ inject+click │
//! └───────────┘   └──────────┘   └──────────┬───────────┘   └──────┬───────┘
//!                                           ▼                      │
//!                                  companion service ◀──── /open ──┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`page`] | Hosted page abstraction and HTML implementation |
//! | [`extract`] | Citation title extraction |
//! | [`encode`] | Query component encoding |
//! | [`transport`] | Direct and relayed requests |
//! | [`relay`] | Privileged relay context |
//! | [`companion`] | Companion service endpoints |
//! | [`bridge`] | Result handling, affordance injection, click handling |
//! | [`augment`] | CLI command drivers |

pub mod augment;
pub mod bridge;
pub mod companion;
pub mod config;
pub mod encode;
pub mod extract;
pub mod models;
pub mod page;
pub mod relay;
pub mod transport;
