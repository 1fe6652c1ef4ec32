//! Page driver backed by a plain HTTP fetch and an HTML DOM walk.
//!
//! The listing is rendered server-side, so fetching the document and walking it
//! with `scraper` yields the same three block shapes a browser session would.

use super::PageDriver;
use crate::error::{MonitorError, Result};
use crate::extractor::{ContainerGroup, LinkBlock, PageBlocks, PriceAnchor, MAX_ANCESTOR_DEPTH};
use log::{debug, info};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::time::Duration;

/// Selector hints for product containers, tried in this order by the tile scan
pub const TILE_SELECTORS: [&str; 9] = [
    "div[class*='product-tile']",
    "div[class*='product-card']",
    "div[class*='product-item']",
    "article[class*='product']",
    "div[class*='tile']",
    "div[class*='card']",
    "li[class*='product']",
    "div[data-product]",
    "a[href*='/product/']",
];

/// Elements whose text never reaches the rendered page
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Fetches the page over HTTP and keeps the last document for block collection
pub struct HttpPageDriver {
    client: reqwest::Client,
    timeout: Duration,
    source: Option<String>,
}

impl HttpPageDriver {
    /// Build a driver whose page loads are bounded by `timeout`
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            timeout,
            source: None,
        })
    }

    fn classify(&self, err: reqwest::Error) -> MonitorError {
        if err.is_timeout() {
            MonitorError::PageLoadTimeout(self.timeout)
        } else {
            MonitorError::Network(err)
        }
    }
}

impl PageDriver for HttpPageDriver {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        info!("Loading page: {url}");
        self.source = None;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(MonitorError::HttpStatus(response.status()));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        debug!("Loaded {} bytes from {url}", body.len());
        self.source = Some(body);
        Ok(())
    }

    fn collect_text_blocks(&self) -> Result<PageBlocks> {
        let source = self.source.as_deref().ok_or(MonitorError::DriverNotReady)?;
        blocks_from_html(source)
    }

    fn page_source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// Derives container, link and price-anchor blocks from an HTML document
pub fn blocks_from_html(html: &str) -> Result<PageBlocks> {
    let document = Html::parse_document(html);

    let mut containers = Vec::with_capacity(TILE_SELECTORS.len());
    for hint in TILE_SELECTORS {
        let selector = parse_selector(hint)?;
        containers.push(ContainerGroup {
            selector: hint.to_string(),
            blocks: document.select(&selector).map(visible_text).collect(),
        });
    }

    let anchor_selector = parse_selector("a[href]")?;
    let links: Vec<LinkBlock> = document
        .select(&anchor_selector)
        .map(|link| LinkBlock {
            href: link.value().attr("href").unwrap_or_default().to_string(),
            text: visible_text(link),
            context: parent_element(link).map(visible_text).unwrap_or_default(),
        })
        .collect();

    let price_anchors = price_anchors(&document);

    debug!(
        "Collected {} container groups, {} links, {} price anchors",
        containers.len(),
        links.len(),
        price_anchors.len()
    );

    Ok(PageBlocks {
        containers,
        links,
        price_anchors,
    })
}

fn parse_selector(hint: &str) -> Result<Selector> {
    Selector::parse(hint).map_err(|_| MonitorError::InvalidSelector(hint.to_string()))
}

/// Elements whose own text contains `$`, each with up to three ancestor contexts
fn price_anchors(document: &Html) -> Vec<PriceAnchor> {
    let mut seen = HashSet::new();
    let mut anchors = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        if !text.contains('$') {
            continue;
        }
        let Some(element) = node.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if is_hidden(element) || !seen.insert(element.id()) {
            continue;
        }

        let mut contexts = Vec::with_capacity(MAX_ANCESTOR_DEPTH);
        let mut current = element;
        for _ in 0..MAX_ANCESTOR_DEPTH {
            match parent_element(current) {
                Some(parent) => {
                    contexts.push(visible_text(parent));
                    current = parent;
                }
                None => break,
            }
        }
        anchors.push(PriceAnchor { contexts });
    }

    anchors
}

fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

fn is_hidden(element: ElementRef<'_>) -> bool {
    HIDDEN_ELEMENTS.contains(&element.value().name())
}

/// Rendered text of an element: one trimmed text run per line, hidden elements skipped
fn visible_text(element: ElementRef<'_>) -> String {
    let mut lines = Vec::new();

    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(is_hidden);
        if hidden {
            continue;
        }
        lines.extend(text.lines().map(str::trim).filter(|line| !line.is_empty()));
    }

    lines.join("\n")
}
