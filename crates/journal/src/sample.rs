use chrono::{DateTime, TimeZone, Utc};
use core_types::{Trade, TradeType};
use rust_decimal_macros::dec;

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

/// The built-in sample ledger installed into empty storage: four closed trades and
/// one open position, in ledger order.
pub fn sample_trades() -> Vec<Trade> {
    vec![
        Trade::new("NVDA", TradeType::Long, dec!(900.5), dec!(10), at(20, 9, 30))
            .with_id("1")
            .with_exit(dec!(950.75), Some(at(20, 14, 0)))
            .with_notes("Caught the morning spike on AI news. Clean execution."),
        Trade::new("BTC/USD", TradeType::Short, dec!(68500), dec!(0.5), at(21, 11, 0))
            .with_id("2")
            .with_exit(dec!(67200), Some(at(21, 18, 45)))
            .with_notes("Sold into the 69k resistance. Played out as planned."),
        Trade::new("ETH/USD", TradeType::Long, dec!(3800), dec!(2), at(22, 8, 0))
            .with_id("3")
            .with_exit(dec!(3750), Some(at(22, 10, 15)))
            .with_notes("Entered too early, stopped out on a wick."),
        Trade::new("TSLA", TradeType::Long, dec!(175), dec!(20), at(23, 10, 0))
            .with_id("4")
            .with_notes("Entry on strong support and a bullish divergence."),
        Trade::new("SPY", TradeType::Short, dec!(530.1), dec!(50), at(24, 13, 0))
            .with_id("5")
            .with_exit(dec!(528.2), Some(at(24, 15, 30)))
            .with_notes("Quick scalp during midday consolidation."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::collections::HashSet;

    #[test]
    fn sample_pnl_matches_the_journal_figures() {
        let pnl: Vec<Option<Decimal>> = sample_trades().iter().map(|t| t.pnl).collect();
        assert_eq!(
            pnl,
            vec![Some(dec!(502.5)), Some(dec!(650)), Some(dec!(-100)), None, Some(dec!(95))]
        );
    }

    #[test]
    fn sample_ids_are_unique_and_open_trade_has_no_exit() {
        let trades = sample_trades();
        let ids: HashSet<&str> = trades.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), trades.len());

        let open = trades.iter().find(|t| t.id == "4").unwrap();
        assert_eq!(open.exit_price, None);
        assert_eq!(open.exit_date, None);
    }
}
