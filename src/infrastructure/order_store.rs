use crate::domain::orders::MarketOrder;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Loads the user's open orders from a JSON snapshot file.
///
/// The snapshot is produced outside this tool (the game-data API fetch is
/// not part of it), so the file is treated as plain input.
pub fn load_orders(path: &Path) -> Result<Vec<MarketOrder>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read orders file {}", path.display()))?;
    let orders: Vec<MarketOrder> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse orders file {}", path.display()))?;
    info!("Loaded {} open orders from {}", orders.len(), path.display());
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::orders::OrderSide;
    use rust_decimal_macros::dec;
    use std::path::PathBuf;

    fn write_orders(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("outbid-orders-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_loads_order_snapshot() {
        let path = write_orders(
            "ok.json",
            r#"[{
                "order_id": 6180551923,
                "type_id": 34,
                "side": "Sell",
                "price": "4.87",
                "volume_remain": 250000,
                "station_id": 60003760
            }]"#,
        );

        let orders = load_orders(&path).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, OrderSide::Sell);
        assert_eq!(orders[0].price, dec!(4.87));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_reports_the_path() {
        let err = load_orders(Path::new("/nonexistent/orders.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/orders.json"));
    }
}
