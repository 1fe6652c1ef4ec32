//! Page driver contract and the HTTP implementation

mod http;

pub use http::{blocks_from_html, HttpPageDriver, TILE_SELECTORS};

use crate::error::Result;
use crate::extractor::PageBlocks;
use std::future::Future;

/// Loads the listing page and exposes its content as text blocks.
///
/// A driver is acquired per session; the monitor drops it after a failed load and
/// launches a fresh one on the next cycle.
pub trait PageDriver {
    /// Load `url`, waiting at most the driver's readiness bound
    fn navigate(&mut self, url: &str) -> impl Future<Output = Result<()>> + Send;

    /// Text blocks for every extraction strategy, from the last loaded page
    fn collect_text_blocks(&self) -> Result<PageBlocks>;

    /// Raw source of the last loaded page, when the driver keeps one
    fn page_source(&self) -> Option<&str> {
        None
    }
}
