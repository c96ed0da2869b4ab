use crate::domain::orders::{MarketLogRecord, MarketOrder, OrderRange, OrderSide, Outbid};
use crate::domain::price::{significant_decrement, significant_increment};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::info;

/// Suggested new price for an outbid order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reprice {
    pub order_id: u64,
    pub side: OrderSide,
    pub current_price: Decimal,
    pub new_price: Decimal,
}

/// Result of matching one market log snapshot against the user's orders.
#[derive(Debug, Default)]
pub struct OutbidReport {
    /// Best competing price per outbid own order, keyed by order id.
    pub outbids: HashMap<u64, Outbid>,
    pub suggestions: Vec<Reprice>,
}

impl OutbidReport {
    /// The own order worth repricing first on the given side: the outbid buy
    /// order with the highest price, or the outbid sell order with the lowest.
    pub fn reprice_target(&self, side: OrderSide) -> Option<&Reprice> {
        let candidates = self.suggestions.iter().filter(|r| r.side == side);
        match side {
            OrderSide::Buy => candidates.max_by_key(|r| r.current_price),
            OrderSide::Sell => candidates.min_by_key(|r| r.current_price),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.outbids.is_empty()
    }
}

/// Matches market log snapshots against the user's own open orders.
///
/// Pure computation: given the same orders, reach and snapshot it always
/// produces the same report.
pub struct OutbidProcessor {
    orders: Vec<MarketOrder>,
    range: OrderRange,
}

impl OutbidProcessor {
    pub fn new(orders: Vec<MarketOrder>, range: OrderRange) -> Self {
        Self { orders, range }
    }

    pub fn process(&self, records: &[MarketLogRecord]) -> OutbidReport {
        let mut report = OutbidReport::default();
        for order in &self.orders {
            let mut best: Option<Decimal> = None;
            let mut count = 0u64;
            for record in records {
                if !self.competes(order, record) {
                    continue;
                }
                let beaten = match order.side {
                    OrderSide::Buy => record.price > order.price,
                    OrderSide::Sell => record.price < order.price,
                };
                if !beaten {
                    continue;
                }
                count += 1;
                best = Some(match (best, order.side) {
                    (None, _) => record.price,
                    (Some(b), OrderSide::Buy) => b.max(record.price),
                    (Some(b), OrderSide::Sell) => b.min(record.price),
                });
            }
            let Some(price) = best else {
                continue;
            };
            report.outbids.insert(order.order_id, Outbid { price, count });
            let new_price = match order.side {
                OrderSide::Buy => significant_increment(price),
                OrderSide::Sell => significant_decrement(price),
            };
            // Zero means no meaningful step could be computed
            if new_price > Decimal::ZERO {
                report.suggestions.push(Reprice {
                    order_id: order.order_id,
                    side: order.side,
                    current_price: order.price,
                    new_price,
                });
            }
        }
        report
    }

    /// Best in-reach price on the given side across the whole snapshot,
    /// stepped. Fallback for when none of our own orders matched the
    /// snapshot's item type.
    pub fn region_price(&self, records: &[MarketLogRecord], side: OrderSide) -> Option<Decimal> {
        let mut price: Option<Decimal> = None;
        for record in records {
            if record.bid != (side == OrderSide::Buy) {
                continue;
            }
            if record.jumps > self.range.jumps() {
                continue;
            }
            price = Some(match (price, side) {
                (None, _) => record.price,
                (Some(p), OrderSide::Buy) => p.max(record.price),
                (Some(p), OrderSide::Sell) => p.min(record.price),
            });
        }
        let price = price?;
        info!("Going region wide: best {} price {}", side, price);
        let stepped = match side {
            OrderSide::Buy => significant_increment(price),
            OrderSide::Sell => significant_decrement(price),
        };
        (stepped > Decimal::ZERO).then_some(stepped)
    }

    fn competes(&self, order: &MarketOrder, record: &MarketLogRecord) -> bool {
        record.type_id == order.type_id
            && record.order_id != order.order_id
            && record.bid == (order.side == OrderSide::Buy)
            && record.jumps <= self.range.jumps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record(order_id: u64, price: Decimal, bid: bool, jumps: i32) -> MarketLogRecord {
        MarketLogRecord {
            price,
            vol_remaining: 1000.0,
            type_id: 34,
            range: 32767,
            order_id,
            vol_entered: 1000,
            min_volume: 1,
            bid,
            issue_date: NaiveDate::from_ymd_opt(2026, 8, 20)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
            duration: 90,
            station_id: 60_003_760,
            region_id: 10_000_002,
            solar_system_id: 30_000_142,
            jumps,
        }
    }

    fn sell_order(order_id: u64, price: Decimal) -> MarketOrder {
        MarketOrder {
            order_id,
            type_id: 34,
            side: OrderSide::Sell,
            price,
            volume_remain: 500,
            station_id: 60_003_760,
        }
    }

    fn buy_order(order_id: u64, price: Decimal) -> MarketOrder {
        MarketOrder {
            side: OrderSide::Buy,
            ..sell_order(order_id, price)
        }
    }

    #[test]
    fn test_sell_order_undercut_by_cheaper_ask() {
        let processor = OutbidProcessor::new(vec![sell_order(1, dec!(126.00))], OrderRange::Region);
        let records = vec![
            record(2, dec!(125.00), false, 0),
            record(3, dec!(124.50), false, 3),
            record(4, dec!(130.00), false, 0), // worse than ours
        ];

        let report = processor.process(&records);
        let outbid = report.outbids.get(&1).expect("order should be outbid");
        assert_eq!(outbid.price, dec!(124.50));
        assert_eq!(outbid.count, 2);

        let reprice = &report.suggestions[0];
        assert_eq!(reprice.order_id, 1);
        assert_eq!(reprice.new_price, dec!(124.40));
    }

    #[test]
    fn test_buy_order_outbid_by_higher_bid() {
        let processor = OutbidProcessor::new(vec![buy_order(7, dec!(50.00))], OrderRange::Region);
        let records = vec![
            record(8, dec!(51.25), true, 0),
            record(9, dec!(49.00), true, 0), // below ours, not a threat
        ];

        let report = processor.process(&records);
        let outbid = report.outbids.get(&7).expect("order should be outbid");
        assert_eq!(outbid.price, dec!(51.25));
        assert_eq!(outbid.count, 1);
        assert_eq!(report.suggestions[0].new_price, dec!(51.26));
    }

    #[test]
    fn test_station_range_ignores_orders_jumps_away() {
        let processor = OutbidProcessor::new(vec![sell_order(1, dec!(126.00))], OrderRange::Station);
        let records = vec![
            record(2, dec!(125.00), false, 0),
            record(3, dec!(124.50), false, 3), // out of reach
        ];

        let report = processor.process(&records);
        let outbid = report.outbids.get(&1).unwrap();
        assert_eq!(outbid.price, dec!(125.00));
        assert_eq!(outbid.count, 1);
        assert_eq!(report.suggestions[0].new_price, dec!(124.90));
    }

    #[test]
    fn test_jump_range_bounds_the_match() {
        let processor =
            OutbidProcessor::new(vec![sell_order(1, dec!(126.00))], OrderRange::Jumps(2));
        let records = vec![
            record(2, dec!(125.00), false, 2),
            record(3, dec!(124.50), false, 3),
        ];

        let report = processor.process(&records);
        assert_eq!(report.outbids.get(&1).unwrap().price, dec!(125.00));
    }

    #[test]
    fn test_own_order_and_opposite_side_do_not_count() {
        let processor = OutbidProcessor::new(vec![sell_order(1, dec!(126.00))], OrderRange::Region);
        let records = vec![
            record(1, dec!(120.00), false, 0), // our own order echoed in the log
            record(2, dec!(120.00), true, 0),  // a bid, not an ask
        ];

        let report = processor.process(&records);
        assert!(report.is_empty());
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn test_best_priced_order_not_outbid() {
        let processor = OutbidProcessor::new(vec![sell_order(1, dec!(124.00))], OrderRange::Region);
        let records = vec![record(2, dec!(125.00), false, 0)];

        let report = processor.process(&records);
        assert!(report.is_empty());
    }

    #[test]
    fn test_reprice_target_picks_lowest_sell_and_highest_buy() {
        let processor = OutbidProcessor::new(
            vec![
                sell_order(1, dec!(126.00)),
                sell_order(2, dec!(127.00)),
                buy_order(3, dec!(50.00)),
                buy_order(4, dec!(49.00)),
            ],
            OrderRange::Region,
        );
        let records = vec![
            record(10, dec!(125.00), false, 0),
            record(11, dec!(51.00), true, 0),
        ];

        let report = processor.process(&records);
        assert_eq!(report.reprice_target(OrderSide::Sell).unwrap().order_id, 1);
        assert_eq!(report.reprice_target(OrderSide::Buy).unwrap().order_id, 3);
    }

    #[test]
    fn test_region_price_fallback() {
        let processor = OutbidProcessor::new(Vec::new(), OrderRange::Region);
        let records = vec![
            record(2, dec!(125.00), false, 0),
            record(3, dec!(124.50), false, 5),
            record(4, dec!(100.00), true, 0),
        ];

        // Undercut the cheapest ask
        assert_eq!(
            processor.region_price(&records, OrderSide::Sell),
            Some(dec!(124.40))
        );
        // Beat the highest bid; 100.00 is a power of ten but we step up
        assert_eq!(
            processor.region_price(&records, OrderSide::Buy),
            Some(dec!(100.10))
        );
        // No asks in reach at station range beyond jumps=0 still finds 125.00
        let station = OutbidProcessor::new(Vec::new(), OrderRange::Station);
        assert_eq!(
            station.region_price(&records, OrderSide::Sell),
            Some(dec!(124.90))
        );
    }

    #[test]
    fn test_region_price_none_when_no_side_matches() {
        let processor = OutbidProcessor::new(Vec::new(), OrderRange::Region);
        let records = vec![record(2, dec!(125.00), false, 0)];
        assert_eq!(processor.region_price(&records, OrderSide::Buy), None);
    }
}
