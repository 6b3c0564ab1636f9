use rust_decimal::Decimal;

use super::Side;

/// A trade instruction replayed from a top wallet onto the virtual portfolio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeSignal {
    /// Wallet whose activity produced this signal.
    pub wallet_address: String,
    pub side: Side,
    pub token: String,
    pub quantity: Decimal,
    pub price: Decimal,
}
