use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;

/// A trade observed on a tracked wallet, as produced by a trade feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    /// Realized profit in SOL.
    pub profit: Decimal,
    pub profit_pct: Decimal,
    /// Capital committed to the position, in SOL.
    pub position_size: Decimal,
    pub action: Side,
    /// SPL token mint address.
    pub token: String,
    pub quantity: Decimal,
    pub price: Decimal,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.profit > Decimal::ZERO
    }
}
