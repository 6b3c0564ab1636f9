use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{Side, Transaction};

pub const DEFAULT_LOG_CAPACITY: usize = 10_000;

/// Why the ledger refused a buy or sell. Nothing was applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeRejected {
    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(Decimal),

    #[error("price must be positive, got {0}")]
    InvalidPrice(Decimal),

    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: Decimal, available: Decimal },

    #[error("insufficient {token} holdings: required {required}, available {available}")]
    InsufficientHoldings {
        token: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("amount out of range: {quantity} @ {price}")]
    Overflow { quantity: Decimal, price: Decimal },
}

/// Consistent point-in-time copy of the whole ledger.
#[derive(Debug, Clone)]
pub struct PortfolioState {
    pub balance: Decimal,
    pub holdings: HashMap<String, Decimal>,
    pub transactions: Vec<Transaction>,
    pub total_transactions: u64,
}

/// In-memory paper-trading ledger: a SOL balance, token holdings and the
/// transaction log, all behind one lock.
///
/// Every mutation checks and applies under the same critical section, so a
/// reader never sees a debit without its matching holding change or log
/// entry. Handles are cheap to clone and share the same ledger.
#[derive(Clone)]
pub struct VirtualPortfolio {
    inner: Arc<Mutex<PortfolioInner>>,
}

struct PortfolioInner {
    balance: Decimal,
    holdings: HashMap<String, Decimal>,
    /// Most recent entries only; oldest evicted past `log_capacity`.
    log: VecDeque<Transaction>,
    log_capacity: usize,
    /// All-time count, unaffected by eviction.
    total_transactions: u64,
    /// Price of the latest trade per token, kept independent of the log.
    last_prices: HashMap<String, Decimal>,
}

impl PortfolioInner {
    fn append(&mut self, side: Side, token: &str, quantity: Decimal, price: Decimal, total: Decimal) -> Transaction {
        let tx = Transaction {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            side,
            token: token.to_string(),
            quantity,
            price,
            total,
        };

        self.last_prices.insert(token.to_string(), price);
        if self.log_capacity > 0 {
            while self.log.len() >= self.log_capacity {
                self.log.pop_front();
            }
            self.log.push_back(tx.clone());
        }
        self.total_transactions += 1;
        tx
    }
}

fn validate(quantity: Decimal, price: Decimal) -> Result<(), TradeRejected> {
    if quantity <= Decimal::ZERO {
        return Err(TradeRejected::InvalidQuantity(quantity));
    }
    if price <= Decimal::ZERO {
        return Err(TradeRejected::InvalidPrice(price));
    }
    Ok(())
}

impl VirtualPortfolio {
    /// Create a ledger seeded with `initial_balance` SOL and no holdings.
    pub fn new(initial_balance: Decimal) -> Self {
        Self::with_log_capacity(initial_balance, DEFAULT_LOG_CAPACITY)
    }

    pub fn with_log_capacity(initial_balance: Decimal, log_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PortfolioInner {
                balance: initial_balance,
                holdings: HashMap::new(),
                log: VecDeque::new(),
                log_capacity,
                total_transactions: 0,
                last_prices: HashMap::new(),
            })),
        }
    }

    /// Spend `quantity * price` SOL on `token`.
    pub async fn buy(&self, token: &str, quantity: Decimal, price: Decimal) -> Result<Transaction, TradeRejected> {
        validate(quantity, price)?;
        let overflow = || TradeRejected::Overflow { quantity, price };
        let cost = quantity.checked_mul(price).ok_or_else(overflow)?;

        let mut inner = self.inner.lock().await;
        if inner.balance < cost {
            return Err(TradeRejected::InsufficientBalance {
                required: cost,
                available: inner.balance,
            });
        }
        let held = inner.holdings.get(token).copied().unwrap_or(Decimal::ZERO);
        let new_held = held.checked_add(quantity).ok_or_else(overflow)?;

        inner.balance -= cost;
        inner.holdings.insert(token.to_string(), new_held);
        let tx = inner.append(Side::Buy, token, quantity, price, cost);

        tracing::debug!(
            token = %token,
            quantity = %quantity,
            price = %price,
            balance = %inner.balance,
            "Portfolio: buy committed"
        );
        Ok(tx)
    }

    /// Sell `quantity` of `token` for `quantity * price` SOL.
    pub async fn sell(&self, token: &str, quantity: Decimal, price: Decimal) -> Result<Transaction, TradeRejected> {
        validate(quantity, price)?;

        let mut inner = self.inner.lock().await;
        let held = inner.holdings.get(token).copied().unwrap_or(Decimal::ZERO);
        if held < quantity {
            return Err(TradeRejected::InsufficientHoldings {
                token: token.to_string(),
                required: quantity,
                available: held,
            });
        }

        let overflow = || TradeRejected::Overflow { quantity, price };
        let revenue = quantity.checked_mul(price).ok_or_else(overflow)?;
        let new_balance = inner.balance.checked_add(revenue).ok_or_else(overflow)?;

        inner.balance = new_balance;
        inner.holdings.insert(token.to_string(), held - quantity);
        let tx = inner.append(Side::Sell, token, quantity, price, revenue);

        tracing::debug!(
            token = %token,
            quantity = %quantity,
            price = %price,
            balance = %inner.balance,
            "Portfolio: sell committed"
        );
        Ok(tx)
    }

    pub async fn balance(&self) -> Decimal {
        self.inner.lock().await.balance
    }

    /// Independent copy of the holdings map.
    pub async fn holdings(&self) -> HashMap<String, Decimal> {
        self.inner.lock().await.holdings.clone()
    }

    /// Retained transaction log, oldest first.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.inner.lock().await.log.iter().cloned().collect()
    }

    /// Balance and holdings read under one lock, without copying the log.
    pub async fn positions(&self) -> (Decimal, HashMap<String, Decimal>) {
        let inner = self.inner.lock().await;
        (inner.balance, inner.holdings.clone())
    }

    pub async fn snapshot(&self) -> PortfolioState {
        let inner = self.inner.lock().await;
        PortfolioState {
            balance: inner.balance,
            holdings: inner.holdings.clone(),
            transactions: inner.log.iter().cloned().collect(),
            total_transactions: inner.total_transactions,
        }
    }

    /// Price of the most recent trade in `token`, even if its log entry has
    /// been evicted.
    pub async fn last_price(&self, token: &str) -> Option<Decimal> {
        self.inner.lock().await.last_prices.get(token).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[tokio::test]
    async fn test_buy_reject_sell_scenario() {
        let portfolio = VirtualPortfolio::new(dec(10));

        portfolio.buy("X", dec(5), dec(1)).await.unwrap();
        assert_eq!(portfolio.balance().await, dec(5));
        assert_eq!(portfolio.holdings().await["X"], dec(5));
        assert_eq!(portfolio.transactions().await.len(), 1);

        // cost 10 > balance 5
        let rejected = portfolio.buy("X", dec(10), dec(1)).await;
        assert_eq!(
            rejected,
            Err(TradeRejected::InsufficientBalance {
                required: dec(10),
                available: dec(5),
            })
        );
        assert_eq!(portfolio.balance().await, dec(5));
        assert_eq!(portfolio.holdings().await["X"], dec(5));
        assert_eq!(portfolio.transactions().await.len(), 1);

        portfolio.sell("X", dec(5), dec(2)).await.unwrap();
        assert_eq!(portfolio.balance().await, dec(15));
        assert_eq!(portfolio.holdings().await["X"], Decimal::ZERO);

        let log = portfolio.transactions().await;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].side, Side::Buy);
        assert_eq!(log[1].side, Side::Sell);
        assert_eq!(log[1].total, dec(10));
    }

    #[tokio::test]
    async fn test_sell_absent_token_rejected() {
        let portfolio = VirtualPortfolio::new(dec(10));
        let result = portfolio.sell("NOPE", dec(1), dec(1)).await;
        assert!(matches!(result, Err(TradeRejected::InsufficientHoldings { .. })));

        let state = portfolio.snapshot().await;
        assert_eq!(state.balance, dec(10));
        assert!(state.holdings.is_empty());
        assert!(state.transactions.is_empty());
    }

    #[tokio::test]
    async fn test_sell_more_than_held_rejected() {
        let portfolio = VirtualPortfolio::new(dec(10));
        portfolio.buy("X", dec(3), dec(1)).await.unwrap();

        let result = portfolio.sell("X", dec(4), dec(1)).await;
        assert!(matches!(result, Err(TradeRejected::InsufficientHoldings { .. })));
        assert_eq!(portfolio.balance().await, dec(7));
        assert_eq!(portfolio.holdings().await["X"], dec(3));
        assert_eq!(portfolio.transactions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_round_trip_restores_balance_exactly() {
        let initial = Decimal::new(1_000_000_001, 8); // 10.00000001
        let portfolio = VirtualPortfolio::new(initial);
        let qty = Decimal::new(333, 2); // 3.33
        let price = Decimal::new(1_234_567, 7); // 0.1234567

        for _ in 0..100 {
            portfolio.buy("BONK", qty, price).await.unwrap();
            portfolio.sell("BONK", qty, price).await.unwrap();
        }

        assert_eq!(portfolio.balance().await, initial);
        assert_eq!(portfolio.holdings().await["BONK"], Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_non_positive_inputs_rejected() {
        let portfolio = VirtualPortfolio::new(dec(10));
        assert_eq!(
            portfolio.buy("X", Decimal::ZERO, dec(1)).await,
            Err(TradeRejected::InvalidQuantity(Decimal::ZERO))
        );
        assert_eq!(
            portfolio.sell("X", dec(1), dec(-1)).await,
            Err(TradeRejected::InvalidPrice(dec(-1)))
        );
        assert!(portfolio.transactions().await.is_empty());
    }

    #[tokio::test]
    async fn test_holdings_copy_is_independent() {
        let portfolio = VirtualPortfolio::new(dec(10));
        portfolio.buy("X", dec(1), dec(1)).await.unwrap();

        let mut copy = portfolio.holdings().await;
        copy.insert("X".into(), dec(1_000));
        copy.insert("Y".into(), dec(1));

        let fresh = portfolio.holdings().await;
        assert_eq!(fresh["X"], dec(1));
        assert!(!fresh.contains_key("Y"));
    }

    #[tokio::test]
    async fn test_concurrent_buys_never_overdraw() {
        let portfolio = VirtualPortfolio::new(dec(10));

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let p = portfolio.clone();
                tokio::spawn(async move { p.buy("X", dec(1), dec(1)).await.is_ok() })
            })
            .collect();

        let mut filled = 0;
        for h in handles {
            if h.await.unwrap() {
                filled += 1;
            }
        }

        assert_eq!(filled, 10);
        let state = portfolio.snapshot().await;
        assert_eq!(state.balance, Decimal::ZERO);
        assert_eq!(state.holdings["X"], dec(10));
        assert_eq!(state.transactions.len(), 10);
    }

    #[tokio::test]
    async fn test_log_eviction_keeps_ledger_intact() {
        let portfolio = VirtualPortfolio::with_log_capacity(dec(100), 3);
        for i in 1..=5 {
            portfolio.buy("X", dec(1), dec(i)).await.unwrap();
        }

        let state = portfolio.snapshot().await;
        assert_eq!(state.transactions.len(), 3);
        assert_eq!(state.total_transactions, 5);
        assert_eq!(state.transactions[0].price, dec(3));
        // 100 - (1 + 2 + 3 + 4 + 5)
        assert_eq!(state.balance, dec(85));
        assert_eq!(state.holdings["X"], dec(5));
    }

    #[tokio::test]
    async fn test_last_price_tracks_latest_fill() {
        let portfolio = VirtualPortfolio::new(dec(100));
        assert_eq!(portfolio.last_price("X").await, None);

        portfolio.buy("X", dec(2), dec(3)).await.unwrap();
        portfolio.buy("Y", dec(1), dec(7)).await.unwrap();
        portfolio.sell("X", dec(1), dec(4)).await.unwrap();

        assert_eq!(portfolio.last_price("X").await, Some(dec(4)));
        assert_eq!(portfolio.last_price("Y").await, Some(dec(7)));
    }

    #[tokio::test]
    async fn test_last_price_survives_log_eviction() {
        let portfolio = VirtualPortfolio::with_log_capacity(dec(100), 2);
        portfolio.buy("X", dec(10), dec(5)).await.unwrap();
        portfolio.buy("Y", dec(1), dec(1)).await.unwrap();
        portfolio.buy("Y", dec(1), dec(1)).await.unwrap();

        assert!(portfolio.transactions().await.iter().all(|tx| tx.token == "Y"));
        assert_eq!(portfolio.last_price("X").await, Some(dec(5)));
    }

    #[tokio::test]
    async fn test_overflowing_amounts_rejected() {
        let portfolio = VirtualPortfolio::new(dec(10));
        assert_eq!(
            portfolio.buy("X", Decimal::MAX, dec(2)).await,
            Err(TradeRejected::Overflow {
                quantity: Decimal::MAX,
                price: dec(2),
            })
        );

        portfolio.buy("X", dec(1), dec(1)).await.unwrap();
        // revenue fits, but crediting it to the 9 SOL balance does not
        let result = portfolio.sell("X", dec(1), Decimal::MAX).await;
        assert!(matches!(result, Err(TradeRejected::Overflow { .. })));

        assert_eq!(portfolio.balance().await, dec(9));
        assert_eq!(portfolio.holdings().await["X"], dec(1));
        assert_eq!(portfolio.transactions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_positions_match_snapshot() {
        let portfolio = VirtualPortfolio::new(dec(10));
        portfolio.buy("X", dec(2), dec(3)).await.unwrap();

        let (balance, holdings) = portfolio.positions().await;
        assert_eq!(balance, dec(4));
        assert_eq!(holdings["X"], dec(2));
    }
}
