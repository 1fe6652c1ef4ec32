use bourbon_monitor::extractor::{ContainerGroup, PageBlocks, PriceAnchor};
use bourbon_monitor::monitor::DEBUG_PAGE_FILE;
use bourbon_monitor::{
    CycleOutcome, Monitor, MonitorConfig, MonitorError, Notifier, PageDriver, Result,
};
use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// Test fixtures - scripted driver and recording notifier

enum Page {
    Blocks(PageBlocks),
    Fail,
    Hang,
}

#[derive(Clone, Default)]
struct Script {
    pages: Arc<Mutex<VecDeque<Page>>>,
    launches: Arc<AtomicUsize>,
}

impl Script {
    fn push(&self, page: Page) {
        self.pages.lock().unwrap().push_back(page);
    }

    fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    fn launcher(&self) -> impl FnMut() -> Result<FakeDriver> {
        let script = self.clone();
        move || {
            script.launches.fetch_add(1, Ordering::SeqCst);
            Ok(FakeDriver {
                script: script.clone(),
                loaded: None,
            })
        }
    }
}

struct FakeDriver {
    script: Script,
    loaded: Option<PageBlocks>,
}

impl PageDriver for FakeDriver {
    async fn navigate(&mut self, _url: &str) -> Result<()> {
        let page = self.script.pages.lock().unwrap().pop_front();
        match page {
            Some(Page::Blocks(blocks)) => {
                self.loaded = Some(blocks);
                Ok(())
            }
            Some(Page::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
            Some(Page::Fail) | None => Err(MonitorError::DriverNotReady),
        }
    }

    fn collect_text_blocks(&self) -> Result<PageBlocks> {
        self.loaded.clone().ok_or(MonitorError::DriverNotReady)
    }

    fn page_source(&self) -> Option<&str> {
        Some("<html>scripted</html>")
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl RecordingNotifier {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        if self.fail {
            return Err(MonitorError::NotifyDelivery("smtp down".to_string()));
        }
        Ok(())
    }
}

fn tiles(blocks: &[&str]) -> Page {
    Page::Blocks(PageBlocks {
        containers: vec![ContainerGroup {
            selector: "div[class*='product-tile']".to_string(),
            blocks: blocks.iter().map(|b| b.to_string()).collect(),
        }],
        ..Default::default()
    })
}

fn config() -> MonitorConfig {
    MonitorConfig {
        url: "https://example.test/whiskey-release".to_string(),
        page_timeout: Duration::from_millis(100),
        expected_products: None,
        ..Default::default()
    }
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

// Scenarios

#[tokio::test]
async fn test_first_cycle_sends_startup_alert() {
    let script = Script::default();
    script.push(tiles(&["X Bourbon\n$40.00\n12 available"]));
    let notifier = RecordingNotifier::default();
    let mut monitor = Monitor::new(config(), script.launcher(), notifier.clone());

    let outcome = monitor.run_cycle_once().await.unwrap();

    assert_eq!(outcome, CycleOutcome::FirstRun);
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "🥃 Bourbon Monitor Started");
    assert!(sent[0].1.contains("PRODUCT 1: 🥃 X Bourbon 💰 $40.00 📏 750ML 📦 12 In Stock"));
}

#[tokio::test]
async fn test_added_removed_and_low_stock_alert() {
    let script = Script::default();
    script.push(tiles(&[
        "A Bourbon\n$10.00\n10 available",
        "B Bourbon\n$20.00\n3 available",
    ]));
    script.push(tiles(&[
        "A Bourbon\n$10.00\n2 available",
        "C Bourbon\n$30.00\n8 available",
    ]));
    let notifier = RecordingNotifier::default();
    let mut monitor = Monitor::new(config(), script.launcher(), notifier.clone());

    monitor.run_cycle_once().await.unwrap();
    let outcome = monitor.run_cycle_once().await.unwrap();

    let CycleOutcome::Changed(diff) = outcome else {
        panic!("expected a change, got {outcome:?}");
    };
    assert_eq!(diff.added, set(&["C Bourbon"]));
    assert_eq!(diff.removed, set(&["B Bourbon"]));
    assert_eq!(diff.low_stock.len(), 1);
    assert_eq!(diff.low_stock[0].name, "A Bourbon");
    assert_eq!(diff.quantity_changes.len(), 1);
    assert_eq!(diff.quantity_changes[0].delta, -8);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    let (subject, body) = &sent[1];
    assert_eq!(subject, "🥃 Bourbon Alert: New Arrivals | Sold Out | Low Inventory");
    assert!(body.contains("NEW PRODUCT 1: 🥃 C Bourbon"));
    assert!(body.contains("SOLD OUT PRODUCT 1: 🥃 B Bourbon"));
    assert!(body.contains("LOW STOCK PRODUCT 1: 🥃 A Bourbon 💰 $10.00 📏 750ML 📦 2 In Stock"));
    assert!(body.contains("📋 COMPLETE CURRENT INVENTORY (2):"));
}

#[tokio::test]
async fn test_no_data_leaves_baseline_untouched() {
    let script = Script::default();
    script.push(tiles(&["A Bourbon\n$10.00\n10 available"]));
    script.push(tiles(&["Newsletter signup"]));
    script.push(tiles(&["A Bourbon\n$10.00\n10 available"]));
    let notifier = RecordingNotifier::default();
    let mut monitor = Monitor::new(config(), script.launcher(), notifier.clone());

    monitor.run_cycle_once().await.unwrap();
    let baseline = monitor.engine().previous().cloned();

    assert_eq!(monitor.run_cycle_once().await.unwrap(), CycleOutcome::NoData);
    assert_eq!(monitor.engine().previous().cloned(), baseline);

    // An empty scrape must not be reported as everything selling out
    assert_eq!(monitor.run_cycle_once().await.unwrap(), CycleOutcome::Unchanged);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_quantity_only_change_is_suppressed_but_advances_baseline() {
    let script = Script::default();
    script.push(tiles(&["A Bourbon\n$10.00\n20 available"]));
    script.push(tiles(&["A Bourbon\n$10.00\n12 available"]));
    let notifier = RecordingNotifier::default();
    let mut monitor = Monitor::new(config(), script.launcher(), notifier.clone());

    monitor.run_cycle_once().await.unwrap();
    let outcome = monitor.run_cycle_once().await.unwrap();

    assert_eq!(outcome, CycleOutcome::Unchanged);
    assert_eq!(notifier.sent().len(), 1);
    let baseline = monitor.engine().previous().unwrap();
    assert_eq!(baseline.get("A Bourbon").unwrap().stock_count, Some(12));
}

#[tokio::test]
async fn test_failed_delivery_still_advances_baseline() {
    let script = Script::default();
    script.push(tiles(&["A Bourbon\n$10.00\n20 available"]));
    script.push(tiles(&["B Bourbon\n$10.00\n20 available"]));
    let notifier = RecordingNotifier::failing();
    let mut monitor = Monitor::new(config(), script.launcher(), notifier.clone());

    assert_eq!(monitor.run_cycle_once().await.unwrap(), CycleOutcome::FirstRun);
    assert!(matches!(
        monitor.run_cycle_once().await.unwrap(),
        CycleOutcome::Changed(_)
    ));

    assert_eq!(notifier.sent().len(), 2);
    assert!(monitor.engine().previous().unwrap().contains("B Bourbon"));
}

#[tokio::test]
async fn test_load_failure_releases_driver_and_relaunches() {
    let script = Script::default();
    script.push(Page::Fail);
    script.push(tiles(&["A Bourbon\n$10.00\n20 available"]));
    let notifier = RecordingNotifier::default();
    let mut monitor = Monitor::new(config(), script.launcher(), notifier.clone());

    assert!(monitor.run_cycle_once().await.is_err());
    assert!(!monitor.has_driver());
    assert!(monitor.engine().previous().is_none());

    assert_eq!(monitor.run_cycle_once().await.unwrap(), CycleOutcome::FirstRun);
    assert!(monitor.has_driver());
    assert_eq!(script.launches(), 2);
}

#[tokio::test]
async fn test_hanging_page_times_out() {
    let script = Script::default();
    script.push(Page::Hang);
    let mut monitor = Monitor::new(config(), script.launcher(), RecordingNotifier::default());

    let result = monitor.run_cycle_once().await;

    assert!(matches!(result, Err(MonitorError::PageLoadTimeout(_))));
    assert!(!monitor.has_driver());
}

#[tokio::test]
async fn test_driver_reused_across_successful_cycles() {
    let script = Script::default();
    script.push(tiles(&["A Bourbon\n$10.00"]));
    script.push(tiles(&["A Bourbon\n$10.00"]));
    let mut monitor = Monitor::new(config(), script.launcher(), RecordingNotifier::default());

    monitor.run_cycle_once().await.unwrap();
    monitor.run_cycle_once().await.unwrap();

    assert_eq!(script.launches(), 1);
    monitor.release_driver();
    assert!(!monitor.has_driver());
}

#[tokio::test]
async fn test_price_anchor_fallback_through_monitor() {
    let script = Script::default();
    script.push(Page::Blocks(PageBlocks {
        price_anchors: vec![PriceAnchor {
            contexts: vec![
                "$64.99".to_string(),
                "Blanton's Original Single Barrel Bourbon (312)\n$64.99\n4 left".to_string(),
            ],
        }],
        ..Default::default()
    }));
    let notifier = RecordingNotifier::default();
    let mut monitor = Monitor::new(config(), script.launcher(), notifier.clone());

    assert_eq!(monitor.run_cycle_once().await.unwrap(), CycleOutcome::FirstRun);
    let baseline = monitor.engine().previous().unwrap();
    let record = baseline.get("Blanton's Original Single Barrel Bourbon").unwrap();
    assert_eq!(record.stock_count, Some(4));
}

#[tokio::test]
async fn test_below_expected_count_dumps_page_source() {
    let dir = TempDir::new().unwrap();
    let script = Script::default();
    script.push(tiles(&["A Bourbon\n$10.00"]));
    let config = MonitorConfig {
        expected_products: Some(7),
        debug_dir: Some(dir.path().join("debug")),
        ..config()
    };
    let mut monitor = Monitor::new(config, script.launcher(), RecordingNotifier::default());

    monitor.run_cycle_once().await.unwrap();

    let dumped = std::fs::read_to_string(dir.path().join("debug").join(DEBUG_PAGE_FILE)).unwrap();
    assert_eq!(dumped, "<html>scripted</html>");
}
