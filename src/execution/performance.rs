use rust_decimal::Decimal;

use crate::models::PerformanceSnapshot;
use crate::pricing::PriceSource;

use super::portfolio::VirtualPortfolio;

/// Mark the portfolio to market against `initial_investment`.
///
/// Holdings are copied out first so price lookups never run under the
/// ledger lock. Tokens whose price cannot be fetched are left out of the
/// total.
pub async fn collect_performance(
    portfolio: &VirtualPortfolio,
    prices: &dyn PriceSource,
    initial_investment: Decimal,
) -> PerformanceSnapshot {
    let (balance, holdings) = portfolio.positions().await;

    let mut total_value = balance;
    for (token, quantity) in &holdings {
        if quantity.is_zero() {
            continue;
        }
        match prices.current_price(token).await {
            Ok(price) => total_value += *quantity * price,
            Err(e) => {
                tracing::warn!(error = %e, token = %token, "Failed to price holding, excluded from value");
            }
        }
    }

    let profit_loss = total_value - initial_investment;
    let profit_loss_pct = profit_loss
        .checked_div(initial_investment)
        .map(|r| r * Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO);

    PerformanceSnapshot {
        total_balance: balance,
        total_value,
        profit_loss,
        profit_loss_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::LedgerPriceSource;
    use std::collections::HashMap;

    struct FixedPrices(HashMap<String, Decimal>);

    #[async_trait::async_trait]
    impl PriceSource for FixedPrices {
        async fn current_price(&self, token: &str) -> anyhow::Result<Decimal> {
            self.0
                .get(token)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("unknown token"))
        }
    }

    #[tokio::test]
    async fn test_marks_holdings_at_current_price() {
        let portfolio = VirtualPortfolio::new(Decimal::from(10));
        portfolio.buy("X", Decimal::from(4), Decimal::ONE).await.unwrap();

        let prices = FixedPrices(HashMap::from([("X".to_string(), Decimal::from(2))]));
        let snap = collect_performance(&portfolio, &prices, Decimal::from(10)).await;

        assert_eq!(snap.total_balance, Decimal::from(6));
        assert_eq!(snap.total_value, Decimal::from(14));
        assert_eq!(snap.profit_loss, Decimal::from(4));
        assert_eq!(snap.profit_loss_pct, Decimal::from(40));
    }

    #[tokio::test]
    async fn test_unpriced_holding_excluded() {
        let portfolio = VirtualPortfolio::new(Decimal::from(10));
        portfolio.buy("X", Decimal::from(5), Decimal::ONE).await.unwrap();

        let prices = FixedPrices(HashMap::new());
        let snap = collect_performance(&portfolio, &prices, Decimal::from(10)).await;

        assert_eq!(snap.total_value, Decimal::from(5));
        assert_eq!(snap.profit_loss_pct, Decimal::from(-50));
    }

    #[tokio::test]
    async fn test_ledger_price_after_log_eviction() {
        let portfolio = VirtualPortfolio::with_log_capacity(Decimal::from(100), 2);
        portfolio.buy("X", Decimal::from(10), Decimal::from(5)).await.unwrap();
        portfolio.buy("Y", Decimal::ONE, Decimal::ONE).await.unwrap();
        portfolio.buy("Y", Decimal::ONE, Decimal::ONE).await.unwrap();

        let prices = LedgerPriceSource::new(portfolio.clone());
        let snap = collect_performance(&portfolio, &prices, Decimal::from(100)).await;

        assert_eq!(snap.total_value, Decimal::from(100));
        assert_eq!(snap.profit_loss_pct, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_zero_initial_investment_has_zero_pct() {
        let portfolio = VirtualPortfolio::new(Decimal::from(3));
        let prices = FixedPrices(HashMap::new());
        let snap = collect_performance(&portfolio, &prices, Decimal::ZERO).await;
        assert_eq!(snap.profit_loss, Decimal::from(3));
        assert_eq!(snap.profit_loss_pct, Decimal::ZERO);
    }
}
