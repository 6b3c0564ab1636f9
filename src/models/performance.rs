use rust_decimal::Decimal;
use serde::Serialize;

/// Marked-to-market view of the portfolio, recomputed every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceSnapshot {
    /// Free SOL balance.
    pub total_balance: Decimal,
    /// Balance plus holdings valued at current prices.
    pub total_value: Decimal,
    pub profit_loss: Decimal,
    pub profit_loss_pct: Decimal,
}
