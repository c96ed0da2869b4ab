use crate::application::outbid_processor::{OutbidProcessor, OutbidReport};
use crate::domain::orders::{MarketLogRecord, MarketOrder, OrderRange, OrderSide};
use crate::infrastructure::marketlog_reader::read_market_log;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{RwLock, mpsc};
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{error, info, warn};

/// Watcher settings that can be retuned while the loop is running.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub range: OrderRange,
    pub reprice_side: OrderSide,
}

/// Report for one processed market log file.
#[derive(Debug)]
pub struct WatchReport {
    pub path: PathBuf,
    pub report: OutbidReport,
    /// Best region-wide price on the reprice side, when no own order matched.
    pub region_price: Option<Decimal>,
}

/// Tails the marketlogs directory and recomputes outbid state for every
/// newly dropped export.
///
/// The game client creates the directory on first export and writes each
/// file atomically, so the watcher waits for the directory to appear and
/// reacts only to files it has not seen before.
pub struct MarketLogWatcher {
    dir: PathBuf,
    poll_interval: Duration,
    orders: Vec<MarketOrder>,
    settings: Arc<RwLock<WatchSettings>>,
    report_tx: mpsc::Sender<WatchReport>,
    seen: HashSet<PathBuf>,
}

const MISSING_DIR_RETRY: Duration = Duration::from_secs(15);

impl MarketLogWatcher {
    pub fn new(
        dir: PathBuf,
        poll_interval: Duration,
        orders: Vec<MarketOrder>,
        settings: Arc<RwLock<WatchSettings>>,
        report_tx: mpsc::Sender<WatchReport>,
    ) -> Self {
        Self {
            dir,
            poll_interval,
            orders,
            settings,
            report_tx,
            seen: HashSet::new(),
        }
    }

    pub async fn run(mut self) {
        while !self.dir.is_dir() {
            warn!(
                "Marketlogs directory {} not found. Retrying in {}s...",
                self.dir.display(),
                MISSING_DIR_RETRY.as_secs()
            );
            time::sleep(MISSING_DIR_RETRY).await;
        }

        // Exports present at startup are stale; only react to new drops
        match self.scan() {
            Ok(paths) => self.seen.extend(paths),
            Err(e) => error!("Failed to scan {}: {}", self.dir.display(), e),
        }
        info!("Waiting for market log drops in {}", self.dir.display());

        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let paths = match self.scan() {
                Ok(paths) => paths,
                Err(e) => {
                    error!("Failed to scan {}: {}", self.dir.display(), e);
                    continue;
                }
            };
            for path in paths {
                if self.seen.contains(&path) {
                    continue;
                }
                info!("Processing market log {}", path.display());
                let start = Instant::now();
                let records = match read_market_log(&path) {
                    Ok(records) => records,
                    Err(e) => {
                        // A torn export means we raced the game's write;
                        // the path stays unseen so the next poll retries
                        // the complete file
                        warn!("Market log not readable yet, will retry: {}", e);
                        continue;
                    }
                };
                self.seen.insert(path.clone());
                if !self.publish(&path, &records, start).await {
                    return; // Consumer went away
                }
            }
        }
    }

    fn scan(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if matches!(path.extension().and_then(|e| e.to_str()), Some("txt") | Some("csv")) {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Returns false when the report channel is closed.
    async fn publish(&self, path: &Path, records: &[MarketLogRecord], start: Instant) -> bool {
        let settings = self.settings.read().await.clone();
        let processor = OutbidProcessor::new(self.orders.clone(), settings.range);
        let report = processor.process(records);
        let region_price = if report.reprice_target(settings.reprice_side).is_none() {
            processor.region_price(records, settings.reprice_side)
        } else {
            None
        };
        info!(
            "Market log processed in {:?}: {} outbid of {} orders",
            start.elapsed(),
            report.outbids.len(),
            self.orders.len()
        );
        let watch_report = WatchReport {
            path: path.to_path_buf(),
            report,
            region_price,
        };
        if self.report_tx.send(watch_report).await.is_err() {
            info!("Report channel closed, stopping watcher");
            return false;
        }
        true
    }
}
