//! One scan cycle: page load, extraction, diff and optional alert.
//!
//! The monitor owns the page driver for as long as loads succeed. Any load
//! failure drops the driver and aborts the cycle; the next cycle launches a
//! fresh one. Nothing here is fatal to the scan loop.

use crate::config::MonitorConfig;
use crate::diff::{DiffEngine, DiffOutcome, DiffResult};
use crate::driver::PageDriver;
use crate::error::{MonitorError, Result};
use crate::extractor::{extract_products, PageBlocks};
use crate::notification::{self, render_record};
use crate::notifier::Notifier;
use crate::snapshot::{ProductRecord, Snapshot};
use chrono::{Local, NaiveDateTime};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// File name of the page dump written when too few products are found
pub const DEBUG_PAGE_FILE: &str = "debug_page_source.html";

/// What one scan cycle observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Extraction found nothing; the baseline was left untouched
    NoData,
    /// First snapshot of the process; the startup alert was sent
    FirstRun,
    /// Nothing alert-worthy (quantity-only changes are logged, not sent)
    Unchanged,
    Changed(DiffResult),
}

/// Scan loop state: configuration, driver session, notifier and baseline
pub struct Monitor<D, N, L> {
    config: MonitorConfig,
    launch: L,
    driver: Option<D>,
    notifier: N,
    engine: DiffEngine,
}

impl<D, N, L> Monitor<D, N, L>
where
    D: PageDriver,
    N: Notifier,
    L: FnMut() -> Result<D>,
{
    /// `launch` is called whenever a fresh driver session is needed
    pub fn new(config: MonitorConfig, launch: L, notifier: N) -> Self {
        let engine = DiffEngine::new(config.low_stock_threshold);
        Self {
            config,
            launch,
            driver: None,
            notifier,
            engine,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn engine(&self) -> &DiffEngine {
        &self.engine
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    /// Runs one full cycle.
    ///
    /// Returns `Err` only when the page could not be loaded; the driver has
    /// already been released by then.
    pub async fn run_cycle_once(&mut self) -> Result<CycleOutcome> {
        info!("Checking for bourbon updates...");

        let blocks = match self.load_blocks().await {
            Ok(blocks) => blocks,
            Err(e) => {
                self.release_driver();
                return Err(e);
            }
        };

        let records = extract_products(&blocks);
        if records.is_empty() {
            warn!("No products found, skipping this cycle");
            return Ok(CycleOutcome::NoData);
        }

        self.check_expected_count(records.len());
        log_inventory(&records);

        Ok(self.process(records, Local::now().naive_local()).await)
    }

    /// Diffs extracted records against the baseline and sends any resulting alert.
    ///
    /// The baseline advances even if delivery fails.
    pub async fn process(
        &mut self,
        records: Vec<ProductRecord>,
        generated_at: NaiveDateTime,
    ) -> CycleOutcome {
        let outcome = self.engine.diff(Snapshot::from_records(records));
        let alert = notification::decide(&outcome, generated_at);

        let cycle = match &outcome {
            DiffOutcome::FirstRun(current) => {
                info!("Initial scan complete - tracking {} products", current.len());
                CycleOutcome::FirstRun
            }
            DiffOutcome::Compared(comparison) => {
                let diff = &comparison.diff;
                for change in &diff.quantity_changes {
                    info!(
                        "Quantity change: {} {} -> {} ({:+})",
                        change.name, change.previous, change.current, change.delta
                    );
                }
                if diff.is_notable() {
                    info!(
                        "Changes detected: +{} new, -{} removed, {} low stock (previous {} -> current {})",
                        diff.added.len(),
                        diff.removed.len(),
                        diff.low_stock.len(),
                        comparison.previous.len(),
                        comparison.current.len()
                    );
                    CycleOutcome::Changed(diff.clone())
                } else {
                    info!("No changes - inventory unchanged");
                    CycleOutcome::Unchanged
                }
            }
        };

        if let Some(alert) = alert {
            if let Err(e) = self.notifier.notify(&alert.subject, &alert.body).await {
                error!("Failed to send alert '{}': {}", alert.subject, e);
            }
        }

        cycle
    }

    /// Releases the page driver; called on shutdown and after a failed load
    pub fn release_driver(&mut self) {
        if self.driver.take().is_some() {
            info!("Page driver released");
        }
    }

    async fn load_blocks(&mut self) -> Result<PageBlocks> {
        if self.driver.is_none() {
            info!("Launching page driver");
            self.driver = Some((self.launch)()?);
        }
        let Some(driver) = self.driver.as_mut() else {
            return Err(MonitorError::DriverNotReady);
        };

        let timeout = self.config.page_timeout;
        tokio::time::timeout(timeout, driver.navigate(&self.config.url))
            .await
            .map_err(|_| MonitorError::PageLoadTimeout(timeout))??;

        driver.collect_text_blocks()
    }

    fn check_expected_count(&self, found: usize) {
        let Some(expected) = self.config.expected_products else {
            return;
        };
        if found >= expected {
            return;
        }
        warn!("Found only {found} products, expected {expected}");

        let source = self.driver.as_ref().and_then(|driver| driver.page_source());
        if let (Some(dir), Some(source)) = (self.config.debug_dir.as_deref(), source) {
            match dump_page_source(dir, source) {
                Ok(path) => info!("Saved page source to {}", path.display()),
                Err(e) => warn!("Could not save page source: {e}"),
            }
        }
    }
}

/// Writes the page source into `dir`, creating it if needed
pub fn dump_page_source(dir: &Path, source: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(DEBUG_PAGE_FILE);
    std::fs::write(&path, source)?;
    Ok(path)
}

fn log_inventory(records: &[ProductRecord]) {
    info!("Found {} products available", records.len());
    for (i, record) in records.iter().enumerate() {
        info!("PRODUCT {}: {}", i + 1, render_record(record));
    }
}
