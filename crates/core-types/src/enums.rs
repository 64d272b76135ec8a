use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The direction of a journaled position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeType {
    Long,
    Short,
}

impl TradeType {
    /// The sign applied to a price move to turn it into profit: `+1` for a long, `-1` for a short.
    pub fn direction(&self) -> Decimal {
        match self {
            TradeType::Long => Decimal::ONE,
            TradeType::Short => Decimal::NEGATIVE_ONE,
        }
    }
}
