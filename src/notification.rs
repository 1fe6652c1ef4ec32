//! Alert decision and message composition

use crate::diff::{Comparison, DiffOutcome};
use crate::snapshot::{ProductRecord, Snapshot};
use chrono::NaiveDateTime;
use std::fmt::Write;

const SUBJECT_STARTED: &str = "🥃 Bourbon Monitor Started";
const SUBJECT_ALERT: &str = "🥃 Bourbon Alert: ";

/// Subject and body ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// Decides whether an outcome warrants an alert and composes it.
///
/// A first run always notifies. A comparison notifies only when something was
/// added, removed or is low on stock.
pub fn decide(outcome: &DiffOutcome, generated_at: NaiveDateTime) -> Option<Notification> {
    match outcome {
        DiffOutcome::FirstRun(current) => Some(startup_notification(current)),
        DiffOutcome::Compared(comparison) if comparison.diff.is_notable() => {
            Some(change_notification(comparison, generated_at))
        }
        DiffOutcome::Compared(_) => None,
    }
}

/// Human-readable one-line rendering of a record
pub fn render_record(record: &ProductRecord) -> String {
    let mut line = format!("🥃 {}", record.name);
    if let Some(price) = &record.price {
        let _ = write!(line, " 💰 {price}");
    }
    if !record.size.is_empty() {
        let _ = write!(line, " 📏 {}", record.size);
    }
    let _ = write!(line, " 📦 {}", record.availability());
    line
}

fn startup_notification(current: &Snapshot) -> Notification {
    let mut body = format!(
        "🚀 Monitoring started successfully!\n\n📊 Currently tracking {} products:\n\n",
        current.len()
    );
    push_entries(&mut body, "PRODUCT", current.iter());

    Notification {
        subject: SUBJECT_STARTED.to_string(),
        body,
    }
}

fn change_notification(comparison: &Comparison, generated_at: NaiveDateTime) -> Notification {
    Notification {
        subject: alert_subject(comparison),
        body: alert_body(comparison, generated_at),
    }
}

fn alert_subject(comparison: &Comparison) -> String {
    let diff = &comparison.diff;
    let added = diff.added.len();
    let removed = diff.removed.len();

    let detail = if diff.low_stock.is_empty() {
        match (added, removed) {
            (a, r) if a > 0 && r > 0 => format!("{a} New, {r} Sold Out"),
            (a, _) if a > 0 => format!("{a} New Arrival{}!", if a > 1 { "s" } else { "" }),
            (_, r) => format!("{r} Sold Out"),
        }
    } else {
        let mut labels = Vec::new();
        if added > 0 {
            labels.push("New Arrivals");
        }
        if removed > 0 {
            labels.push("Sold Out");
        }
        labels.push("Low Inventory");
        labels.join(" | ")
    };

    format!("{SUBJECT_ALERT}{detail}")
}

fn alert_body(comparison: &Comparison, generated_at: NaiveDateTime) -> String {
    let Comparison {
        previous,
        current,
        diff,
    } = comparison;

    let mut body = format!(
        "🥃 BOURBON INVENTORY ALERT\n📅 {}\n\n",
        generated_at.format("%B %d, %Y at %I:%M %p")
    );

    if !diff.added.is_empty() {
        let _ = write!(body, "🆕 NEW ARRIVALS ({}):\n\n", diff.added.len());
        push_entries(
            &mut body,
            "NEW PRODUCT",
            diff.added.iter().filter_map(|name| current.get(name)),
        );
    }

    if !diff.removed.is_empty() {
        let _ = write!(body, "❌ NO LONGER AVAILABLE ({}):\n\n", diff.removed.len());
        push_entries(
            &mut body,
            "SOLD OUT PRODUCT",
            diff.removed.iter().filter_map(|name| previous.get(name)),
        );
    }

    if !diff.low_stock.is_empty() {
        let _ = write!(body, "⚠️ LOW INVENTORY ({}):\n\n", diff.low_stock.len());
        push_entries(&mut body, "LOW STOCK PRODUCT", diff.low_stock.iter());
    }

    let _ = write!(body, "📋 COMPLETE CURRENT INVENTORY ({}):\n\n", current.len());
    push_entries(&mut body, "PRODUCT", current.iter());

    body
}

fn push_entries<'a>(
    body: &mut String,
    label: &str,
    records: impl Iterator<Item = &'a ProductRecord>,
) {
    for (i, record) in records.enumerate() {
        let _ = write!(body, "{label} {}: {}\n\n", i + 1, render_record(record));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffEngine;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    fn stocked(name: &str, count: u32) -> ProductRecord {
        ProductRecord::new(name).with_price("$49.99").with_stock(count)
    }

    fn compare(previous: Vec<ProductRecord>, current: Vec<ProductRecord>) -> DiffOutcome {
        let mut engine = DiffEngine::default();
        engine.diff(Snapshot::from_records(previous));
        engine.diff(Snapshot::from_records(current))
    }

    #[test]
    fn renders_all_present_fields() {
        let record = stocked("Blanton's Bourbon", 12);
        assert_eq!(
            render_record(&record),
            "🥃 Blanton's Bourbon 💰 $49.99 📏 750ML 📦 12 In Stock"
        );
    }

    #[test]
    fn omits_absent_price() {
        let record = ProductRecord::new("Blanton's Bourbon");
        assert_eq!(render_record(&record), "🥃 Blanton's Bourbon 📏 750ML 📦 In Stock");
    }

    #[test]
    fn first_run_always_notifies() {
        let outcome = DiffOutcome::FirstRun(Snapshot::from_records(vec![stocked("X", 12)]));
        let notification = decide(&outcome, at()).unwrap();

        assert_eq!(notification.subject, "🥃 Bourbon Monitor Started");
        assert!(notification.body.contains("Currently tracking 1 products"));
        assert!(notification.body.contains("PRODUCT 1: 🥃 X 💰 $49.99 📏 750ML 📦 12 In Stock"));
    }

    #[test]
    fn quantity_only_change_is_silent() {
        let outcome = compare(vec![stocked("A", 20)], vec![stocked("A", 9)]);
        assert!(decide(&outcome, at()).is_none());
    }

    #[test]
    fn unchanged_is_silent() {
        let outcome = compare(vec![stocked("A", 20)], vec![stocked("A", 20)]);
        assert!(decide(&outcome, at()).is_none());
    }

    #[test]
    fn legacy_subject_wording() {
        let one_new = compare(vec![], vec![stocked("A", 20)]);
        let two_new = compare(vec![], vec![stocked("A", 20), stocked("B", 20)]);
        let sold_out = compare(vec![stocked("A", 20)], vec![]);
        let both = compare(vec![stocked("A", 20)], vec![stocked("B", 20)]);

        let subject = |o: &DiffOutcome| decide(o, at()).unwrap().subject;
        assert_eq!(subject(&one_new), "🥃 Bourbon Alert: 1 New Arrival!");
        assert_eq!(subject(&two_new), "🥃 Bourbon Alert: 2 New Arrivals!");
        assert_eq!(subject(&sold_out), "🥃 Bourbon Alert: 1 Sold Out");
        assert_eq!(subject(&both), "🥃 Bourbon Alert: 1 New, 1 Sold Out");
    }

    #[test]
    fn low_stock_subject_joins_labels() {
        let low_only = compare(vec![stocked("A", 20)], vec![stocked("A", 4)]);
        let all = compare(
            vec![stocked("A", 10), stocked("B", 3)],
            vec![stocked("A", 2), stocked("C", 8)],
        );

        assert_eq!(
            decide(&low_only, at()).unwrap().subject,
            "🥃 Bourbon Alert: Low Inventory"
        );
        assert_eq!(
            decide(&all, at()).unwrap().subject,
            "🥃 Bourbon Alert: New Arrivals | Sold Out | Low Inventory"
        );
    }

    #[test]
    fn body_sections_in_fixed_order() {
        let outcome = compare(
            vec![stocked("A", 10), stocked("B", 3)],
            vec![stocked("A", 2), stocked("C", 8)],
        );
        let body = decide(&outcome, at()).unwrap().body;

        assert!(body.starts_with("🥃 BOURBON INVENTORY ALERT\n📅 October 16, 2026 at 02:05 PM\n\n"));
        let new_at = body.find("NEW PRODUCT 1: 🥃 C").unwrap();
        let sold_at = body.find("SOLD OUT PRODUCT 1: 🥃 B").unwrap();
        let low_at = body.find("LOW STOCK PRODUCT 1: 🥃 A").unwrap();
        let full_at = body.find("📋 COMPLETE CURRENT INVENTORY (2):").unwrap();
        assert!(new_at < sold_at && sold_at < low_at && low_at < full_at);
        assert!(body.ends_with("PRODUCT 2: 🥃 C 💰 $49.99 📏 750ML 📦 8 In Stock\n\n"));
    }
}
