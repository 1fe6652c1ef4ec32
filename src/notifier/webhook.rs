//! Webhook notifier: posts alerts as JSON to a relay endpoint

use super::Notifier;
use crate::error::{MonitorError, Result};
use serde::Serialize;
use std::time::Duration;

/// Payload posted for each alert
#[derive(Debug, Serialize)]
struct AlertPayload<'a> {
    subject: &'a str,
    body: &'a str,
    recipients: &'a [String],
}

/// Posts alerts to an HTTP endpoint that fans them out to the recipient list
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    recipients: Vec<String>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, recipients: Vec<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            recipients,
        })
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        let payload = AlertPayload {
            subject,
            body,
            recipients: &self.recipients,
        };

        let response = self
            .client
            .post(&self.url)
            .header("User-Agent", "bourbon_monitor/1.0")
            .json(&payload)
            .send()
            .await
            .map_err(|e| MonitorError::NotifyDelivery(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(MonitorError::NotifyDelivery(format!("{status}: {detail}")));
        }

        log::info!("Alert sent to {} recipient(s)", self.recipients.len());
        Ok(())
    }
}
