use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Profit summed over all trades closed on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub pnl: Decimal,
}

/// Database row for the wallet_metrics table.
///
/// `daily_pnl_trend` lives in its own table and is not loaded by the
/// top-wallet query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WalletMetrics {
    pub wallet_address: String,
    pub trade_count: i32,
    /// Percentage in [0, 100].
    pub win_rate: Decimal,
    pub average_profit: Decimal,
    pub average_profit_pct: Decimal,
    pub average_loss: Decimal,
    pub average_loss_pct: Decimal,
    pub average_position_size: Decimal,
    pub average_trade_duration_secs: i64,
    #[sqlx(skip)]
    pub daily_pnl_trend: Vec<DailyPnl>,
}

impl WalletMetrics {
    pub fn empty(wallet_address: &str) -> Self {
        Self {
            wallet_address: wallet_address.to_string(),
            ..Self::default()
        }
    }
}
