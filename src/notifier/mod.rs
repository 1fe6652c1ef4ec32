//! Alert delivery

mod webhook;

pub use webhook::WebhookNotifier;

use crate::error::Result;
use std::future::Future;

/// Delivers a fully formatted alert to the configured recipients
pub trait Notifier {
    fn notify(&self, subject: &str, body: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Writes alerts to the log instead of delivering them
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        log::info!("{subject}\n{body}");
        Ok(())
    }
}
