//! Error types for bourbon_monitor

use std::time::Duration;
use thiserror::Error;

/// Unified error type for monitor operations
#[derive(Debug, Error)]
pub enum MonitorError {
    /// HTTP request failed (network error, connection refused, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP error status code
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    /// The page did not become ready within the configured bound
    #[error("Page did not load within {0:?}")]
    PageLoadTimeout(Duration),
    /// Text blocks were requested before a page was loaded
    #[error("Page driver has no loaded page")]
    DriverNotReady,
    /// A CSS selector hint failed to parse
    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Notifier could not deliver the alert
    #[error("Notification delivery failed: {0}")]
    NotifyDelivery(String),
    /// Configuration value rejected
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;
