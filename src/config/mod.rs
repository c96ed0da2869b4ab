//! Configuration for the outbid tool.
//!
//! Settings are layered: `OUTBID_*` environment variables override the
//! persisted settings file, which overrides built-in defaults.

use crate::domain::orders::{OrderRange, OrderSide};
use crate::infrastructure::settings_persistence::PersistedSettings;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the game client drops market log exports into.
    pub marketlog_dir: PathBuf,
    /// JSON snapshot of the user's own open orders.
    pub orders_file: PathBuf,
    /// How far away competing orders still count.
    pub range: OrderRange,
    /// Side the reprice target is picked from.
    pub reprice_side: OrderSide,
    pub poll_interval: Duration,
}

impl Config {
    pub fn from_env(persisted: &PersistedSettings) -> Result<Self> {
        let home = env::var("HOME").context("Could not find HOME directory")?;

        let marketlog_dir = env::var("OUTBID_MARKETLOG_DIR")
            .map(PathBuf::from)
            .ok()
            .or_else(|| persisted.marketlog_dir.clone())
            .unwrap_or_else(|| PathBuf::from(&home).join("Documents/EVE/logs/Marketlogs"));

        let orders_file = env::var("OUTBID_ORDERS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(&home).join(".outbid/orders.json"));

        let range = match env::var("OUTBID_RANGE") {
            Ok(raw) => raw
                .parse::<OrderRange>()
                .map_err(|e| e.context("Invalid OUTBID_RANGE"))?,
            Err(_) => persisted
                .order_range
                .parse::<OrderRange>()
                .map_err(|e| e.context("Invalid order range in settings file"))?,
        };

        let reprice_side = match env::var("OUTBID_SIDE") {
            Ok(raw) => raw
                .parse::<OrderSide>()
                .map_err(|e| e.context("Invalid OUTBID_SIDE"))?,
            Err(_) => persisted
                .reprice_side
                .parse::<OrderSide>()
                .map_err(|e| e.context("Invalid reprice side in settings file"))?,
        };

        let poll_interval = match env::var("OUTBID_POLL_MS") {
            Ok(raw) => Duration::from_millis(
                raw.parse::<u64>().context("Invalid OUTBID_POLL_MS")?,
            ),
            Err(_) => DEFAULT_POLL_INTERVAL,
        };

        Ok(Self {
            marketlog_dir,
            orders_file,
            range,
            reprice_side,
            poll_interval,
        })
    }
}
