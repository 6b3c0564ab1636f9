pub mod jupiter;

pub use jupiter::JupiterPriceSource;

use rust_decimal::Decimal;

use crate::execution::VirtualPortfolio;

/// Current SOL price of a token, used to mark holdings to market.
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    async fn current_price(&self, token: &str) -> anyhow::Result<Decimal>;
}

/// Marks each token at the price of its most recent ledger transaction.
#[derive(Clone)]
pub struct LedgerPriceSource {
    portfolio: VirtualPortfolio,
}

impl LedgerPriceSource {
    pub fn new(portfolio: VirtualPortfolio) -> Self {
        Self { portfolio }
    }
}

#[async_trait::async_trait]
impl PriceSource for LedgerPriceSource {
    async fn current_price(&self, token: &str) -> anyhow::Result<Decimal> {
        self.portfolio
            .last_price(token)
            .await
            .ok_or_else(|| anyhow::anyhow!("no ledger price for {token}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ledger_price_follows_last_fill() {
        let portfolio = VirtualPortfolio::new(Decimal::from(100));
        let prices = LedgerPriceSource::new(portfolio.clone());

        assert!(prices.current_price("X").await.is_err());

        portfolio.buy("X", Decimal::ONE, Decimal::from(3)).await.unwrap();
        assert_eq!(prices.current_price("X").await.unwrap(), Decimal::from(3));
    }
}
