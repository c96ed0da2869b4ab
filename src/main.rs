//! outbid - market-order outbid assistant
//!
//! Watches the game client's market log exports, matches them against the
//! user's own open orders and suggests the next significant price step for
//! any order that has been outbid.
//!
//! # Usage
//! ```sh
//! outbid step --value 100.00 --direction down
//! outbid scan "~/Documents/EVE/logs/Marketlogs/The Forge-Tritanium.txt"
//! outbid watch --range region --side sell
//! ```
//!
//! # Environment Variables
//! - `OUTBID_MARKETLOG_DIR` - Directory the game drops market logs into
//! - `OUTBID_ORDERS_FILE` - JSON snapshot of own open orders
//! - `OUTBID_RANGE` - Matching reach: station, system, region or a jump count
//! - `OUTBID_SIDE` - Side the reprice target is picked from: buy or sell
//! - `OUTBID_POLL_MS` - Directory poll interval in milliseconds (default: 2000)

use anyhow::Result;
use clap::{Parser, Subcommand};
use outbid::application::outbid_processor::{OutbidProcessor, OutbidReport};
use outbid::application::watcher::{MarketLogWatcher, WatchSettings};
use outbid::config::Config;
use outbid::domain::orders::{MarketOrder, OrderRange, OrderSide};
use outbid::domain::price::{PriceDirection, significant_step};
use outbid::infrastructure::marketlog_reader::read_market_log;
use outbid::infrastructure::order_store;
use outbid::infrastructure::settings_persistence::{PersistedSettings, SettingsPersistence};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Market-order outbid assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute one significant price step
    Step {
        /// Current order price
        #[arg(long)]
        value: Decimal,
        /// 'up' to beat a buy order, 'down' to undercut a sell order
        #[arg(long)]
        direction: PriceDirection,
    },
    /// Match one market log export against the order snapshot
    Scan {
        /// Path to the market log file
        file: PathBuf,
    },
    /// Watch the marketlogs directory and report on every new export
    Watch {
        /// Matching reach override; remembered for the next run
        #[arg(long)]
        range: Option<OrderRange>,
        /// Reprice side override; remembered for the next run
        #[arg(long)]
        side: Option<OrderSide>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Step { value, direction } => {
            println!("{}", significant_step(value, direction));
            Ok(())
        }
        Command::Scan { file } => scan(&file),
        Command::Watch { range, side } => watch(range, side).await,
    }
}

fn scan(file: &Path) -> Result<()> {
    let persistence = SettingsPersistence::new()?;
    let persisted = persistence.load()?.unwrap_or_default();
    let config = Config::from_env(&persisted)?;

    let orders = load_orders_or_empty(&config.orders_file);
    let records = read_market_log(file)?;
    let processor = OutbidProcessor::new(orders, config.range);
    let report = processor.process(&records);
    let region_price = if report.reprice_target(config.reprice_side).is_none() {
        processor.region_price(&records, config.reprice_side)
    } else {
        None
    };
    print_report(&report, region_price, config.reprice_side);
    Ok(())
}

async fn watch(range: Option<OrderRange>, side: Option<OrderSide>) -> Result<()> {
    let persistence = SettingsPersistence::new()?;
    let mut persisted = persistence.load()?.unwrap_or_default();

    // Overrides given on the command line are remembered for the next run
    if let Some(range) = range {
        persisted.order_range = range.to_string();
    }
    if let Some(side) = side {
        persisted.reprice_side = side.to_string();
    }
    if range.is_some() || side.is_some() {
        persistence.save(&persisted)?;
    }

    let mut config = Config::from_env(&persisted)?;
    if let Some(range) = range {
        config.range = range;
    }
    if let Some(side) = side {
        config.reprice_side = side;
    }
    info!(
        "Watching {} (range: {}, side: {})",
        config.marketlog_dir.display(),
        config.range,
        config.reprice_side
    );

    let orders = load_orders_or_empty(&config.orders_file);
    let settings = Arc::new(RwLock::new(WatchSettings {
        range: config.range,
        reprice_side: config.reprice_side,
    }));
    let (report_tx, mut report_rx) = mpsc::channel(16);
    let watcher = MarketLogWatcher::new(
        config.marketlog_dir.clone(),
        config.poll_interval,
        orders,
        settings,
        report_tx,
    );
    tokio::spawn(watcher.run());

    while let Some(watch_report) = report_rx.recv().await {
        println!("--- {}", watch_report.path.display());
        print_report(
            &watch_report.report,
            watch_report.region_price,
            config.reprice_side,
        );
    }
    Ok(())
}

fn load_orders_or_empty(path: &Path) -> Vec<MarketOrder> {
    match order_store::load_orders(path) {
        Ok(orders) => orders,
        Err(e) => {
            warn!("{:#}. Only region-wide prices will be reported.", e);
            Vec::new()
        }
    }
}

fn print_report(report: &OutbidReport, region_price: Option<Decimal>, side: OrderSide) {
    for reprice in &report.suggestions {
        if let Some(outbid) = report.outbids.get(&reprice.order_id) {
            println!(
                "order {} ({}) at {} outbid by {} order(s), best {} -> reprice {}",
                reprice.order_id,
                reprice.side,
                reprice.current_price,
                outbid.count,
                outbid.price,
                reprice.new_price
            );
        }
    }
    if let Some(target) = report.reprice_target(side) {
        println!("Reprice target: order {} -> {}", target.order_id, target.new_price);
    } else if let Some(price) = region_price {
        println!("No own {} order matched; region-wide price step: {}", side, price);
    } else {
        println!("Nothing outbid");
    }
}
