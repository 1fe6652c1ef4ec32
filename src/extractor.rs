//! Candidate extraction: turns the page driver's text blocks into product records.
//!
//! Three structurally independent strategies are tried in a fixed order and the
//! first one that yields at least one record wins. Each strategy is a plain
//! function over [`PageBlocks`], so the fallback chain can be tested without a
//! browser or network.

use crate::parser::{contains_whiskey_keyword, parse_fields};
use crate::snapshot::ProductRecord;
use log::{debug, info};
use std::collections::HashSet;

/// Path fragment identifying links into a product detail page
pub const PRODUCT_PATH: &str = "/product/";

/// Maximum number of enclosing contexts walked from a price fragment
pub const MAX_ANCESTOR_DEPTH: usize = 3;

/// Container blocks matched by one selector hint, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerGroup {
    pub selector: String,
    pub blocks: Vec<String>,
}

/// A hyperlink and the text of its enclosing element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkBlock {
    pub href: String,
    pub text: String,
    pub context: String,
}

/// Enclosing contexts of one text fragment containing `$`, nearest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceAnchor {
    pub contexts: Vec<String>,
}

/// Everything the page driver yields for one page load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageBlocks {
    pub containers: Vec<ContainerGroup>,
    pub links: Vec<LinkBlock>,
    pub price_anchors: Vec<PriceAnchor>,
}

/// One extraction heuristic
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub scan: fn(&PageBlocks) -> Vec<ProductRecord>,
}

/// Strategies in priority order
pub const STRATEGIES: [Strategy; 3] = [
    Strategy {
        name: "tile scan",
        scan: tile_scan,
    },
    Strategy {
        name: "link-anchored scan",
        scan: link_scan,
    },
    Strategy {
        name: "price-anchored scan",
        scan: price_anchor_scan,
    },
];

/// Runs [`STRATEGIES`] and returns the sorted records of the first productive one.
///
/// An empty result means no strategy found anything; callers treat that as "no data".
pub fn extract_products(blocks: &PageBlocks) -> Vec<ProductRecord> {
    extract_with(&STRATEGIES, blocks)
}

/// Runs the given strategies in order, stopping at the first non-empty result
pub fn extract_with(strategies: &[Strategy], blocks: &PageBlocks) -> Vec<ProductRecord> {
    for strategy in strategies {
        let mut records = (strategy.scan)(blocks);
        if records.is_empty() {
            info!("No products found via {}", strategy.name);
            continue;
        }

        records.sort_by_cached_key(ProductRecord::listing_key);
        info!(
            "Found {} unique products via {}",
            records.len(),
            strategy.name
        );
        return records;
    }

    Vec::new()
}

/// First-occurrence-wins record collector
#[derive(Default)]
struct Collector {
    seen: HashSet<String>,
    records: Vec<ProductRecord>,
}

impl Collector {
    fn push(&mut self, record: ProductRecord, via: &str) {
        if self.seen.insert(record.name.clone()) {
            debug!(
                "Found product via {via}: {} - {}",
                record.name,
                record.price.as_deref().unwrap_or("")
            );
            self.records.push(record);
        }
    }
}

/// Parses a whiskey-related blob into a record; blocks that fail to parse are skipped
fn record_from(text: &str) -> Option<ProductRecord> {
    if !contains_whiskey_keyword(text) {
        return None;
    }
    match parse_fields(text) {
        Ok(fields) => fields.into_record(),
        Err(e) => {
            debug!("Skipping block: {e}");
            None
        }
    }
}

/// Product container blocks, one selector group at a time.
///
/// The first group that yields any record ends the scan.
pub fn tile_scan(blocks: &PageBlocks) -> Vec<ProductRecord> {
    let mut collector = Collector::default();

    for group in &blocks.containers {
        if group.blocks.is_empty() {
            continue;
        }
        debug!(
            "Found {} potential products with selector: {}",
            group.blocks.len(),
            group.selector
        );

        for block in group.blocks.iter().map(|b| b.trim()).filter(|b| !b.is_empty()) {
            if let Some(record) = record_from(block) {
                collector.push(record, "tile");
            }
        }

        if !collector.records.is_empty() {
            break;
        }
    }

    collector.records
}

/// Links into product detail pages, parsed from their enclosing element's text
pub fn link_scan(blocks: &PageBlocks) -> Vec<ProductRecord> {
    let mut collector = Collector::default();

    let product_links = blocks
        .links
        .iter()
        .filter(|link| link.href.contains(PRODUCT_PATH) && !link.text.trim().is_empty());

    for link in product_links {
        if let Some(record) = record_from(link.context.trim()) {
            collector.push(record, "link");
        }
    }

    collector.records
}

/// Walks up from each `$` fragment until a context yields a name and price
pub fn price_anchor_scan(blocks: &PageBlocks) -> Vec<ProductRecord> {
    let mut collector = Collector::default();

    for anchor in &blocks.price_anchors {
        for context in anchor.contexts.iter().take(MAX_ANCESTOR_DEPTH) {
            let context = context.trim();
            if !contains_whiskey_keyword(context) {
                continue;
            }
            match parse_fields(context) {
                Ok(fields) => {
                    if let Some(record) = fields.into_record() {
                        collector.push(record, "text");
                        break;
                    }
                }
                Err(e) => {
                    debug!("Abandoning price anchor: {e}");
                    break;
                }
            }
        }
    }

    collector.records
}

#[cfg(test)]
#[path = "extractor_tests.rs"]
mod tests;
