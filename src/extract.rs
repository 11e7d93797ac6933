//! Citation metadata extraction.

use crate::config::PageConfig;
use crate::models::Citation;
use crate::page::HostPage;

/// Reads the citation title off the page.
///
/// A missing descriptor yields `Citation { title: None }`; the search still
/// goes ahead with an empty query.
pub fn extract_citation(page: &dyn HostPage, config: &PageConfig) -> Citation {
    let title = page.attribute(&config.title_selector, &config.title_attribute);
    match &title {
        Some(t) => tracing::info!(title = %t, "citation title"),
        None => tracing::info!(
            selector = %config.title_selector,
            "no citation title on page"
        ),
    }
    Citation { title }
}
