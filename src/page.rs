//! The hosted page.
//!
//! [`HostPage`] is everything the bridge needs from a document: reading one
//! attribute and prepending the affordance to a container. [`HtmlPage`]
//! implements it over a `scraper` DOM that can be rendered back to HTML.

use anyhow::{anyhow, bail, Context, Result};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;

use crate::models::Affordance;

/// Read/modify access to the document the bridge augments.
pub trait HostPage {
    /// Value of `attribute` on the first element matching `selector`.
    fn attribute(&self, selector: &str, attribute: &str) -> Option<String>;

    /// Inserts `affordance` as the first child of the first element matching
    /// `container`. Returns `false` if nothing matched.
    fn prepend_affordance(&mut self, container: &str, affordance: &Affordance) -> Result<bool>;
}

/// An HTML document held in memory.
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page: {}", path.display()))?;
        Ok(Self::parse(&html))
    }

    /// Downloads a page over HTTP(S).
    pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<Self> {
        let response = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch page: {}", url))?;
        let status = response.status();
        if !status.is_success() {
            bail!("Failed to fetch page {}: HTTP {}", url, status);
        }
        let html = response.text().await?;
        Ok(Self::parse(&html))
    }

    /// Elements matching `selector`, in document order.
    ///
    /// `Html::select` walks the node arena, where prepended nodes sit after
    /// everything parsed with the page.
    fn select<'a, 'b>(&'a self, selector: &'b Selector) -> impl Iterator<Item = ElementRef<'a>> + 'b
    where
        'a: 'b,
    {
        self.document.root_element().select(selector)
    }

    /// Serializes the (possibly augmented) document.
    pub fn render(&self) -> String {
        self.document.html()
    }

    /// Number of elements matching `selector`; 0 for an invalid selector.
    pub fn count(&self, selector: &str) -> usize {
        match Selector::parse(selector) {
            Ok(sel) => self.select(&sel).count(),
            Err(_) => 0,
        }
    }

    /// Concatenated text of the first element matching `selector`.
    pub fn text(&self, selector: &str) -> Option<String> {
        let sel = Selector::parse(selector).ok()?;
        let text = self.select(&sel)
            .next()
            .map(|el| el.text().collect::<String>());
        text
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("invalid selector '{}': {}", selector, e))
}

impl HostPage for HtmlPage {
    fn attribute(&self, selector: &str, attribute: &str) -> Option<String> {
        let sel = Selector::parse(selector).ok()?;
        let value = self.select(&sel)
            .next()
            .and_then(|el| el.value().attr(attribute))
            .map(str::to_string);
        value
    }

    fn prepend_affordance(&mut self, container: &str, affordance: &Affordance) -> Result<bool> {
        let container_sel = parse_selector(container)?;
        let Some(container_id) = self.select(&container_sel).next().map(|el| el.id())
        else {
            return Ok(false);
        };

        let fragment = Html::parse_fragment(&affordance.to_markup());
        let item_sel = parse_selector("li")?;
        let item_id = fragment
            .select(&item_sel)
            .next()
            .map(|el| el.id())
            .ok_or_else(|| anyhow!("affordance markup has no list item"))?;
        let item = fragment
            .tree
            .get(item_id)
            .ok_or_else(|| anyhow!("affordance node missing"))?;

        let copied_id = self
            .document
            .tree
            .get_mut(container_id)
            .ok_or_else(|| anyhow!("container node missing"))?
            .prepend(item.value().clone())
            .id();

        // Copy the item's subtree out of the fragment, depth first.
        let mut pending = vec![(item_id, copied_id)];
        while let Some((source_id, dest_id)) = pending.pop() {
            let Some(source) = fragment.tree.get(source_id) else {
                continue;
            };
            for child in source.children() {
                let Some(mut dest) = self.document.tree.get_mut(dest_id) else {
                    break;
                };
                let new_id = dest.append(child.value().clone()).id();
                pending.push((child.id(), new_id));
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head>
<meta name="citation_title" content="Attention Is All You Need">
</head><body>
<div class="full-text"><ul><li><a href="/pdf/1706.03762">PDF</a></li></ul></div>
<div class="full-text"><ul><li>Other</li></ul></div>
</body></html>"#;

    #[test]
    fn reads_meta_content() {
        let page = HtmlPage::parse(PAGE);
        assert_eq!(
            page.attribute("meta[name=citation_title]", "content").as_deref(),
            Some("Attention Is All You Need")
        );
        assert_eq!(page.attribute("meta[name=citation_doi]", "content"), None);
        assert_eq!(page.attribute("meta[name=citation_title]", "lang"), None);
    }

    #[test]
    fn invalid_selector_reads_nothing() {
        let page = HtmlPage::parse(PAGE);
        assert_eq!(page.attribute("meta[[", "content"), None);
    }

    #[test]
    fn prepends_into_first_container_only() {
        let mut page = HtmlPage::parse(PAGE);
        let injected = page
            .prepend_affordance(".full-text ul", &Affordance::new("Open in Pulp", "open_in_pulp"))
            .unwrap();
        assert!(injected);

        assert_eq!(page.count("a.open_in_pulp"), 1);
        assert_eq!(page.text(".full-text ul li").as_deref(), Some("Open in Pulp"));
        assert_eq!(page.count(".full-text ul li"), 3);

        let html = page.render();
        let link = html.find("open_in_pulp").unwrap();
        let pdf = html.find("/pdf/1706.03762").unwrap();
        assert!(link < pdf, "affordance should come first: {}", html);
        assert!(html.contains("href=\"#\""));
    }

    #[test]
    fn reads_follow_document_order_after_prepend() {
        let mut page = HtmlPage::parse(PAGE);
        page.prepend_affordance(".full-text ul", &Affordance::new("Open in Pulp", "open_in_pulp"))
            .unwrap();

        assert_eq!(page.text("li").as_deref(), Some("Open in Pulp"));
        assert_eq!(page.attribute(".full-text ul li a", "href").as_deref(), Some("#"));

        // A second prepend still targets the first container in the document.
        page.prepend_affordance(".full-text ul", &Affordance::new("Again", "open_in_pulp"))
            .unwrap();
        assert_eq!(page.text(".full-text ul li").as_deref(), Some("Again"));
        assert_eq!(page.text(".full-text:nth-of-type(2) ul li").as_deref(), Some("Other"));
    }

    #[test]
    fn missing_container_is_not_an_error() {
        let mut page = HtmlPage::parse("<html><body><p>nothing</p></body></html>");
        let before = page.render();
        let injected = page
            .prepend_affordance(".full-text ul", &Affordance::new("Open in Pulp", "open_in_pulp"))
            .unwrap();
        assert!(!injected);
        assert_eq!(page.render(), before);
    }

    #[test]
    fn label_is_text_not_markup() {
        let mut page = HtmlPage::parse(PAGE);
        page.prepend_affordance(".full-text ul", &Affordance::new("<b>Open</b>", "open_in_pulp"))
            .unwrap();
        assert_eq!(page.count(".full-text b"), 0);
        assert_eq!(page.text("a.open_in_pulp").as_deref(), Some("<b>Open</b>"));
    }

    #[test]
    fn reads_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("abs.html");
        std::fs::write(&path, PAGE).unwrap();
        let page = HtmlPage::from_file(&path).unwrap();
        assert_eq!(page.count(".full-text"), 2);
    }
}
