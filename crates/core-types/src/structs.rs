use crate::enums::TradeType;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Realized profit or loss of a position.
///
/// `(exit - entry) * size * direction - commission`, where direction is `+1` for
/// a long and `-1` for a short. Returns `None` when the result does not fit in a `Decimal`.
pub fn calculate_pnl(
    trade_type: TradeType,
    entry_price: Decimal,
    exit_price: Decimal,
    size: Decimal,
    commission: Decimal,
) -> Option<Decimal> {
    exit_price
        .checked_sub(entry_price)?
        .checked_mul(size)?
        .checked_mul(trade_type.direction())?
        .checked_sub(commission)
}

/// A single journaled position.
///
/// `pnl` is `Some` exactly when `exit_price` is `Some`. Every constructor in this
/// crate maintains that, and the stores never mutate a trade after it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub instrument: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub size: Decimal,
    #[serde(default)]
    pub commission: Decimal,
    pub entry_date: DateTime<Utc>,
    pub exit_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub chart_image_url: Option<String>,
    pub pnl: Option<Decimal>,
}

impl Trade {
    /// Creates an open position with a fresh id and no commission.
    pub fn new(
        instrument: impl Into<String>,
        trade_type: TradeType,
        entry_price: Decimal,
        size: Decimal,
        entry_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            instrument: instrument.into(),
            trade_type,
            entry_price,
            exit_price: None,
            size,
            commission: Decimal::ZERO,
            entry_date,
            exit_date: None,
            notes: None,
            chart_image_url: None,
            pnl: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_commission(mut self, commission: Decimal) -> Self {
        self.commission = commission;
        self.refresh_pnl();
        self
    }

    /// Closes the position at `exit_price`. The exit date is optional, mirroring the journal form.
    pub fn with_exit(mut self, exit_price: Decimal, exit_date: Option<DateTime<Utc>>) -> Self {
        self.exit_price = Some(exit_price);
        self.exit_date = exit_date;
        self.refresh_pnl();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_chart_image_url(mut self, url: Option<String>) -> Self {
        self.chart_image_url = url;
        self
    }

    /// A trade counts as closed once it carries a realized P/L.
    pub fn is_closed(&self) -> bool {
        self.pnl.is_some()
    }

    // An out-of-range P/L leaves the trade without one; forms reject such input first.
    fn refresh_pnl(&mut self) {
        self.pnl = self.exit_price.and_then(|exit| {
            calculate_pnl(
                self.trade_type,
                self.entry_price,
                exit,
                self.size,
                self.commission,
            )
        });
    }
}

/// A free-form analysis note, optionally carrying a screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub screenshot_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn entry_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0).unwrap()
    }

    #[test]
    fn long_pnl_subtracts_commission() {
        let trade = Trade::new("NVDA", TradeType::Long, dec!(100), dec!(10), entry_date())
            .with_commission(dec!(5))
            .with_exit(dec!(110), None);
        assert_eq!(trade.pnl, Some(dec!(95)));
    }

    #[test]
    fn short_pnl_inverts_the_price_move() {
        let trade = Trade::new("NVDA", TradeType::Short, dec!(100), dec!(10), entry_date())
            .with_commission(dec!(5))
            .with_exit(dec!(110), None);
        assert_eq!(trade.pnl, Some(dec!(-105)));
    }

    #[test]
    fn open_trade_has_no_pnl() {
        let trade = Trade::new("TSLA", TradeType::Long, dec!(175), dec!(20), entry_date())
            .with_commission(dec!(2));
        assert!(!trade.is_closed());
        assert_eq!(trade.pnl, None);
    }

    #[test]
    fn commission_applied_after_exit_still_counts() {
        let trade = Trade::new("SPY", TradeType::Long, dec!(10), dec!(1), entry_date())
            .with_exit(dec!(12), None)
            .with_commission(dec!(0.5));
        assert_eq!(trade.pnl, Some(dec!(1.5)));
    }

    #[test]
    fn overflowing_pnl_is_none() {
        let pnl = calculate_pnl(TradeType::Long, dec!(1), Decimal::MAX, dec!(2), Decimal::ZERO);
        assert_eq!(pnl, None);

        let trade = Trade::new("XYZ", TradeType::Short, dec!(1), dec!(2), entry_date())
            .with_exit(Decimal::MAX, None);
        assert_eq!(trade.pnl, None);
    }

    #[test]
    fn trade_json_uses_camel_case_and_type_key() {
        let trade = Trade::new("BTC/USD", TradeType::Short, dec!(68500), dec!(0.5), entry_date())
            .with_id("2")
            .with_exit(dec!(67200), Some(entry_date()));
        let json = serde_json::to_value(&trade).unwrap();

        assert_eq!(json["type"], "Short");
        assert_eq!(json["entryPrice"], "68500");
        assert!(json.get("chartImageUrl").is_some());
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn stored_trade_without_commission_defaults_to_zero() {
        let raw = r#"{
            "id": "1",
            "instrument": "NVDA",
            "type": "Long",
            "entryPrice": 900.5,
            "exitPrice": 950.75,
            "size": 10,
            "entryDate": "2024-05-20T09:30:00Z",
            "exitDate": "2024-05-20T14:00:00Z",
            "pnl": 502.5
        }"#;
        let trade: Trade = serde_json::from_str(raw).unwrap();

        assert_eq!(trade.commission, Decimal::ZERO);
        assert_eq!(trade.pnl, Some(dec!(502.5)));
        assert_eq!(trade.chart_image_url, None);
    }
}
