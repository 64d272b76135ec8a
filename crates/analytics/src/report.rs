use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Headline statistics over the closed trades of a ledger.
///
/// `avg_loss` is the mean of the non-positive P/Ls, so it is zero or negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStats {
    pub total_pnl: Decimal,
    /// Percentage in `[0, 100]`.
    pub win_rate: Decimal,
    pub avg_profit: Decimal,
    pub avg_loss: Decimal,

    pub closed_trades: usize,
    pub open_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
}

impl TradeStats {
    /// Creates a new, zeroed-out report. This is also the answer for an empty ledger.
    pub fn new() -> Self {
        Self {
            total_pnl: Decimal::ZERO,
            win_rate: Decimal::ZERO,
            avg_profit: Decimal::ZERO,
            avg_loss: Decimal::ZERO,
            closed_trades: 0,
            open_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
        }
    }
}

impl Default for TradeStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Realized P/L of every trade that exited on `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub pnl: Decimal,
}

/// Account value at the end of `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: Decimal,
}
