use crate::error::AnalyticsError;
use crate::report::{DailyPnl, EquityPoint, TradeStats};
use chrono::NaiveDate;
use core_types::Trade;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// A stateless calculator for deriving journal metrics from the trade ledger.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summary statistics over the closed trades.
    ///
    /// Every ratio whose denominator would be zero is reported as zero.
    pub fn calculate_stats(&self, trades: &[Trade]) -> Result<TradeStats, AnalyticsError> {
        let mut stats = TradeStats::new();
        let mut gross_profit = Decimal::ZERO;
        let mut gross_loss = Decimal::ZERO;

        for trade in trades {
            let Some(pnl) = trade.pnl else {
                stats.open_trades += 1;
                continue;
            };

            stats.closed_trades += 1;
            stats.total_pnl = checked_sum(stats.total_pnl, pnl, "total_pnl")?;

            if pnl > Decimal::ZERO {
                stats.winning_trades += 1;
                gross_profit = checked_sum(gross_profit, pnl, "gross_profit")?;
            } else {
                stats.losing_trades += 1;
                gross_loss = checked_sum(gross_loss, pnl, "gross_loss")?;
            }
        }

        // --- Ratios ---
        if stats.closed_trades > 0 {
            stats.win_rate = (Decimal::from(stats.winning_trades)
                / Decimal::from(stats.closed_trades))
                * Decimal::ONE_HUNDRED;
        }

        if stats.winning_trades > 0 {
            stats.avg_profit = gross_profit / Decimal::from(stats.winning_trades);
        }

        if stats.losing_trades > 0 {
            stats.avg_loss = gross_loss / Decimal::from(stats.losing_trades);
        }

        Ok(stats)
    }

    /// Realized P/L per UTC calendar day of exit, ascending by date.
    ///
    /// Only trades with both a P/L and an exit date count. Days without exits are
    /// absent rather than zero.
    pub fn process_trade_data(&self, trades: &[Trade]) -> Result<Vec<DailyPnl>, AnalyticsError> {
        let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

        for trade in trades {
            let (Some(pnl), Some(exit_date)) = (trade.pnl, trade.exit_date) else {
                continue;
            };
            let day = buckets.entry(exit_date.date_naive()).or_insert(Decimal::ZERO);
            *day = checked_sum(*day, pnl, "daily_pnl")?;
        }

        Ok(buckets
            .into_iter()
            .map(|(date, pnl)| DailyPnl { date, pnl })
            .collect())
    }

    /// The account value after each day with realized P/L, starting from `initial_capital`.
    pub fn equity_curve(
        &self,
        trades: &[Trade],
        initial_capital: Decimal,
    ) -> Result<Vec<EquityPoint>, AnalyticsError> {
        if initial_capital.is_sign_negative() {
            return Err(AnalyticsError::InvalidInput(
                "initial_capital".to_string(),
                "must not be negative".to_string(),
            ));
        }

        let mut equity = initial_capital;
        self.process_trade_data(trades)?
            .into_iter()
            .map(|day| {
                equity = checked_sum(equity, day.pnl, "equity")?;
                Ok(EquityPoint {
                    date: day.date,
                    equity,
                })
            })
            .collect()
    }
}

fn checked_sum(acc: Decimal, value: Decimal, metric: &str) -> Result<Decimal, AnalyticsError> {
    acc.checked_add(value)
        .ok_or_else(|| AnalyticsError::Overflow(metric.to_string()))
}
