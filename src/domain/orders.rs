use anyhow::bail;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" => Ok(OrderSide::Buy),
            "sell" => Ok(OrderSide::Sell),
            _ => bail!("Invalid order side: {}. Must be 'buy' or 'sell'", s),
        }
    }
}

/// How far from the order's station competing orders are matched against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderRange {
    Station,
    SolarSystem,
    Jumps(u32),
    Region,
}

impl OrderRange {
    /// Maximum jump distance a competing order may be at and still count.
    pub fn jumps(&self) -> i32 {
        match self {
            OrderRange::Station | OrderRange::SolarSystem => 0,
            OrderRange::Jumps(n) => *n as i32,
            OrderRange::Region => i32::MAX,
        }
    }
}

impl fmt::Display for OrderRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderRange::Station => write!(f, "station"),
            OrderRange::SolarSystem => write!(f, "system"),
            OrderRange::Jumps(n) => write!(f, "{n}"),
            OrderRange::Region => write!(f, "region"),
        }
    }
}

impl FromStr for OrderRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "station" => Ok(OrderRange::Station),
            "system" | "solarsystem" => Ok(OrderRange::SolarSystem),
            "region" => Ok(OrderRange::Region),
            other => match other.parse::<u32>() {
                Ok(n) => Ok(OrderRange::Jumps(n)),
                Err(_) => bail!(
                    "Invalid order range: {}. Must be 'station', 'system', 'region' or a jump count",
                    s
                ),
            },
        }
    }
}

/// One of the user's own open market orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketOrder {
    pub order_id: u64,
    pub type_id: i32,
    pub side: OrderSide,
    pub price: Decimal,
    pub volume_remain: i64,
    pub station_id: u64,
}

/// Best competing price beating one of our orders, and how many orders beat it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbid {
    pub price: Decimal,
    pub count: u64,
}

/// One row of a market log export: a single competing order in the snapshot
/// the game client writes when the user exports a market view.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketLogRecord {
    pub price: Decimal,
    #[serde(rename = "volRemaining")]
    pub vol_remaining: f64,
    #[serde(rename = "typeID")]
    pub type_id: i32,
    pub range: i32,
    #[serde(rename = "orderID")]
    pub order_id: u64,
    #[serde(rename = "volEntered")]
    pub vol_entered: i64,
    #[serde(rename = "minVolume")]
    pub min_volume: i64,
    #[serde(deserialize_with = "export_bool")]
    pub bid: bool,
    #[serde(rename = "issueDate", deserialize_with = "export_timestamp")]
    pub issue_date: NaiveDateTime,
    pub duration: i32,
    #[serde(rename = "stationID")]
    pub station_id: u64,
    #[serde(rename = "regionID")]
    pub region_id: i64,
    #[serde(rename = "solarSystemID")]
    pub solar_system_id: i64,
    pub jumps: i32,
}

// The game exports booleans as "True"/"False"
fn export_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.as_str() {
        "True" | "true" | "1" => Ok(true),
        "False" | "false" | "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid bid flag: {other}"))),
    }
}

// Issue dates come as "2026-08-21 18:23:45.000", not RFC 3339
fn export_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f").map_err(serde::de::Error::custom)
}
