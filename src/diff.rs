//! Snapshot comparison and the process-lifetime baseline.

use crate::snapshot::{ProductRecord, Snapshot};
use std::collections::BTreeSet;

/// Stock counts strictly below this are "low inventory"
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// A stock count that moved between two snapshots for the same product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityChange {
    pub name: String,
    pub previous: u32,
    pub current: u32,
    pub delta: i64,
}

/// Differences between a previous and a current snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub low_stock: Vec<ProductRecord>,
    pub quantity_changes: Vec<QuantityChange>,
}

impl DiffResult {
    /// Whether the diff carries anything worth alerting on.
    ///
    /// Quantity changes alone do not count.
    pub fn is_notable(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty() || !self.low_stock.is_empty()
    }
}

/// A diff together with the two snapshots it was computed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub previous: Snapshot,
    pub current: Snapshot,
    pub diff: DiffResult,
}

/// Result of feeding a snapshot to the [`DiffEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    /// No baseline existed yet; the snapshot only initialises the monitor
    FirstRun(Snapshot),
    Compared(Comparison),
}

/// Computes the diff between two snapshots. Pure; no baseline is touched.
pub fn compute_diff(
    previous: &Snapshot,
    current: &Snapshot,
    low_stock_threshold: u32,
) -> DiffResult {
    let added = current
        .names()
        .filter(|name| !previous.contains(name))
        .map(str::to_string)
        .collect();

    let removed = previous
        .names()
        .filter(|name| !current.contains(name))
        .map(str::to_string)
        .collect();

    let quantity_changes = current
        .iter()
        .filter_map(|record| {
            let before = previous.get(&record.name)?.stock_count?;
            let now = record.stock_count?;
            (before != now).then(|| QuantityChange {
                name: record.name.clone(),
                previous: before,
                current: now,
                delta: i64::from(now) - i64::from(before),
            })
        })
        .collect();

    let low_stock = current
        .iter()
        .filter(|record| matches!(record.stock_count, Some(count) if count < low_stock_threshold))
        .cloned()
        .collect();

    DiffResult {
        added,
        removed,
        low_stock,
        quantity_changes,
    }
}

/// Holds the last observed snapshot for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    previous: Option<Snapshot>,
    low_stock_threshold: u32,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(LOW_STOCK_THRESHOLD)
    }
}

impl DiffEngine {
    pub fn new(low_stock_threshold: u32) -> Self {
        Self {
            previous: None,
            low_stock_threshold,
        }
    }

    /// Compares `current` against the baseline, then makes `current` the new baseline.
    ///
    /// The baseline advances on every call, including quantity-only changes, so the
    /// same delta is never reported twice.
    pub fn diff(&mut self, current: Snapshot) -> DiffOutcome {
        match self.previous.replace(current.clone()) {
            None => DiffOutcome::FirstRun(current),
            Some(previous) => {
                let diff = compute_diff(&previous, &current, self.low_stock_threshold);
                DiffOutcome::Compared(Comparison {
                    previous,
                    current,
                    diff,
                })
            }
        }
    }

    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
