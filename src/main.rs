//! Bourbon Monitor - whiskey release inventory watcher
//!
//! Checks the release listing on a fixed interval and sends an alert when
//! products arrive, sell out or run low.

use bourbon_monitor::config::{default_debug_dir, DEFAULT_URL, DEFAULT_USER_AGENT};
use bourbon_monitor::{
    HttpPageDriver, LogNotifier, Monitor, MonitorConfig, Notifier, WebhookNotifier,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::interval;

/// Whiskey release monitor - alerts on new arrivals, sell-outs and low stock
#[derive(Parser, Debug)]
#[command(name = "bourbon_monitor")]
#[command(version, about, long_about = None)]
struct Args {
    /// Listing page to watch
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Run a single check and exit (default: run continuously)
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Check interval in seconds when running continuously
    #[arg(long, default_value_t = 300)]
    interval_secs: u64,

    /// Maximum seconds to wait for the page to load
    #[arg(long, default_value_t = 30)]
    page_timeout_secs: u64,

    /// Stock counts below this are reported as low inventory
    #[arg(long, default_value_t = 5)]
    low_stock: u32,

    /// Warn and save the page source when fewer products than this are found (0 disables)
    #[arg(long, default_value_t = 7)]
    expected: usize,

    /// Directory for page dumps
    #[arg(long, default_value_t = default_debug_dir_string())]
    debug_dir: String,

    /// Webhook that relays alerts to the recipients (alerts are only logged when unset)
    #[arg(long, env = "BOURBON_WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Alert recipients, comma separated
    #[arg(long, env = "BOURBON_NOTIFY", value_delimiter = ',')]
    notify: Vec<String>,
}

fn default_debug_dir_string() -> String {
    default_debug_dir().to_string_lossy().to_string()
}

impl Args {
    fn into_config(self) -> MonitorConfig {
        MonitorConfig {
            url: self.url,
            check_interval: Duration::from_secs(self.interval_secs),
            page_timeout: Duration::from_secs(self.page_timeout_secs),
            low_stock_threshold: self.low_stock,
            expected_products: (self.expected > 0).then_some(self.expected),
            debug_dir: Some(PathBuf::from(self.debug_dir)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            recipients: self.notify,
            webhook_url: self.webhook_url,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let once = args.once;
    let config = args.into_config();

    if let Err(e) = config.validate() {
        log::error!("{}", e);
        std::process::exit(1);
    }

    log::info!("Starting bourbon_monitor...");
    log::info!("Monitoring: {}", config.url);
    log::info!("Check interval: {}s", config.check_interval.as_secs());

    match config.webhook_url.clone() {
        Some(url) => {
            let notifier = match WebhookNotifier::new(url, config.recipients.clone()) {
                Ok(notifier) => notifier,
                Err(e) => {
                    log::error!("Failed to create webhook notifier: {}", e);
                    std::process::exit(1);
                }
            };
            log::info!("Notifications: {}", notifier.recipients().join(", "));
            run(config, notifier, once).await;
        }
        None => {
            log::warn!("No webhook configured, alerts will only be logged");
            run(config, LogNotifier, once).await;
        }
    }
}

async fn run<N: Notifier>(config: MonitorConfig, notifier: N, once: bool) {
    let user_agent = config.user_agent.clone();
    let page_timeout = config.page_timeout;
    let launch = move || HttpPageDriver::new(&user_agent, page_timeout);
    let mut monitor = Monitor::new(config, launch, notifier);

    if once {
        run_check(&mut monitor).await;
        monitor.release_driver();
        return;
    }

    run_daemon(&mut monitor).await;
    monitor.release_driver();
    log::info!("Monitor stopped by user");
}

/// Checks immediately, then on every tick until Ctrl-C.
///
/// Ctrl-C is only observed between checks; a check in flight runs to completion,
/// bounded by the page timeout and the notifier's request timeout.
async fn run_daemon<N, L>(monitor: &mut Monitor<HttpPageDriver, N, L>)
where
    N: Notifier,
    L: FnMut() -> bourbon_monitor::Result<HttpPageDriver>,
{
    let mut ticker = interval(monitor.config().check_interval);
    let mut shutdown = std::pin::pin!(tokio::signal::ctrl_c());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_check(monitor).await;
                log::info!(
                    "Next check in {}s",
                    monitor.config().check_interval.as_secs()
                );
            }
            _ = &mut shutdown => break,
        }
    }
}

async fn run_check<N, L>(monitor: &mut Monitor<HttpPageDriver, N, L>)
where
    N: Notifier,
    L: FnMut() -> bourbon_monitor::Result<HttpPageDriver>,
{
    match monitor.run_cycle_once().await {
        Ok(outcome) => log::debug!("Cycle outcome: {:?}", outcome),
        Err(e) => log::error!("Check failed: {}", e),
    }
}
