//! Monitor configuration

use crate::diff::LOW_STOCK_THRESHOLD;
use crate::error::{MonitorError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Whiskey release listing watched by default
pub const DEFAULT_URL: &str =
    "https://www.finewineandgoodspirits.com/en/whiskey-release/whiskey-release";

/// Desktop browser user agent sent with page loads
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Everything a monitor needs, injected by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub url: String,
    pub check_interval: Duration,
    /// Upper bound on one page load
    pub page_timeout: Duration,
    pub low_stock_threshold: u32,
    /// Fewer products than this triggers a warning and a page dump
    pub expected_products: Option<usize>,
    pub debug_dir: Option<PathBuf>,
    pub user_agent: String,
    pub recipients: Vec<String>,
    pub webhook_url: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            check_interval: Duration::from_secs(300),
            page_timeout: Duration::from_secs(30),
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            expected_products: Some(7),
            debug_dir: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            recipients: Vec::new(),
            webhook_url: None,
        }
    }
}

impl MonitorConfig {
    /// Reject values the scan loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(MonitorError::Config("url must not be empty".to_string()));
        }
        if self.check_interval.is_zero() {
            return Err(MonitorError::Config(
                "check interval must be greater than zero".to_string(),
            ));
        }
        if self.page_timeout.is_zero() {
            return Err(MonitorError::Config(
                "page timeout must be greater than zero".to_string(),
            ));
        }
        if self.low_stock_threshold == 0 {
            return Err(MonitorError::Config(
                "low stock threshold must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Returns the default debug dump directory: ~/.local/share/bourbon_monitor/debug
pub fn default_debug_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bourbon_monitor")
        .join("debug")
}
