use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Side;

/// One committed mutation of the virtual portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub side: Side,
    pub token: String,
    pub quantity: Decimal,
    pub price: Decimal,
    /// `quantity * price` in SOL.
    pub total: Decimal,
}
