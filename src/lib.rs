//! Bourbon Monitor - whiskey release inventory watcher
//!
//! Scrapes the release listing on a fixed interval, turns the page text into
//! product records, diffs each snapshot against the previous one and alerts on
//! new arrivals, sell-outs and low stock.

pub mod config;
pub mod diff;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod monitor;
pub mod notification;
pub mod notifier;
pub mod parser;
pub mod snapshot;

pub use config::MonitorConfig;
pub use diff::{compute_diff, DiffEngine, DiffOutcome, DiffResult, QuantityChange};
pub use driver::{HttpPageDriver, PageDriver};
pub use error::{MonitorError, Result};
pub use extractor::{extract_products, PageBlocks};
pub use monitor::{CycleOutcome, Monitor};
pub use notification::{decide, Notification};
pub use notifier::{LogNotifier, Notifier, WebhookNotifier};
pub use parser::parse_fields;
pub use snapshot::{ProductRecord, Snapshot};
