use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::models::{Side, Trade};

use super::{FeedError, TradeFeed};

/// Deterministic in-memory trade feed for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct FixtureTradeFeed {
    trades: HashMap<String, Vec<Trade>>,
    recent: HashMap<String, Vec<Trade>>,
    failing: HashSet<String>,
}

impl FixtureTradeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed trade history for `wallet`.
    pub fn with_trades(mut self, wallet: &str, trades: Vec<Trade>) -> Self {
        self.trades.insert(wallet.to_string(), trades);
        self
    }

    /// Recent activity for `wallet`, replayed as signals.
    pub fn with_recent(mut self, wallet: &str, trades: Vec<Trade>) -> Self {
        self.recent.insert(wallet.to_string(), trades);
        self
    }

    /// Every fetch for `wallet` fails.
    pub fn with_failure(mut self, wallet: &str) -> Self {
        self.failing.insert(wallet.to_string());
        self
    }

    /// Seed each wallet with 60 closed trades ending at `now` and a small
    /// buy-then-sell pair of recent activity.
    ///
    /// The n-th wallet wins `60 - 5n` of its trades, so earlier wallets rank
    /// higher and later ones eventually drop under typical thresholds.
    pub fn demo(wallets: &[String], now: DateTime<Utc>) -> Self {
        let mut feed = Self::new();
        for (n, wallet) in wallets.iter().enumerate() {
            let winners = 60usize.saturating_sub(5 * n);
            let history = (0..60)
                .map(|i| {
                    let profit = if i < winners { Decimal::from(15) } else { Decimal::from(-5) };
                    let close_time = now - Duration::hours(i as i64 + 1);
                    closed_trade(close_time, profit, Decimal::from(200))
                })
                .collect();

            let token = format!("DEMO{n}");
            let recent = vec![
                recent_trade(now - Duration::minutes(90), Side::Buy, &token, Decimal::from(2), Decimal::from(2)),
                recent_trade(now - Duration::minutes(30), Side::Sell, &token, Decimal::ONE, Decimal::new(19, 1)),
            ];

            feed = feed.with_trades(wallet, history).with_recent(wallet, recent);
        }
        feed
    }
}

fn closed_trade(close_time: DateTime<Utc>, profit: Decimal, position_size: Decimal) -> Trade {
    Trade {
        open_time: close_time - Duration::hours(1),
        close_time,
        profit,
        profit_pct: profit / position_size * Decimal::ONE_HUNDRED,
        position_size,
        action: Side::Buy,
        token: "SHITCOIN".into(),
        quantity: Decimal::from(100),
        price: Decimal::from(2),
    }
}

fn recent_trade(at: DateTime<Utc>, side: Side, token: &str, quantity: Decimal, price: Decimal) -> Trade {
    Trade {
        open_time: at,
        close_time: at,
        profit: Decimal::ZERO,
        profit_pct: Decimal::ZERO,
        position_size: quantity * price,
        action: side,
        token: token.to_string(),
        quantity,
        price,
    }
}

#[async_trait::async_trait]
impl TradeFeed for FixtureTradeFeed {
    async fn fetch_trades(&self, wallet: &str) -> Result<Vec<Trade>, FeedError> {
        if self.failing.contains(wallet) {
            return Err(FeedError::Unavailable(wallet.to_string()));
        }
        Ok(self.trades.get(wallet).cloned().unwrap_or_default())
    }

    async fn fetch_recent_trades(&self, wallet: &str, limit: usize) -> Result<Vec<Trade>, FeedError> {
        if self.failing.contains(wallet) {
            return Err(FeedError::Unavailable(wallet.to_string()));
        }
        let recent = self.recent.get(wallet).map(Vec::as_slice).unwrap_or_default();
        let start = recent.len().saturating_sub(limit);
        Ok(recent[start..].to_vec())
    }
}
