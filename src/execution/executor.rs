use metrics::counter;

use crate::models::{Side, TradeSignal, Transaction};

use super::portfolio::{TradeRejected, VirtualPortfolio};

/// Replay one signal against the paper portfolio.
///
/// A rejection is an expected outcome: it is logged and returned, never
/// escalated.
pub async fn execute_signal(
    portfolio: &VirtualPortfolio,
    signal: &TradeSignal,
) -> Result<Transaction, TradeRejected> {
    let result = match signal.side {
        Side::Buy => portfolio.buy(&signal.token, signal.quantity, signal.price).await,
        Side::Sell => portfolio.sell(&signal.token, signal.quantity, signal.price).await,
    };

    match &result {
        Ok(tx) => {
            counter!("trades_executed_total", "side" => signal.side.as_str()).increment(1);
            tracing::info!(
                wallet = %signal.wallet_address,
                side = %signal.side,
                token = %signal.token,
                quantity = %signal.quantity,
                price = %signal.price,
                total = %tx.total,
                "Simulated trade executed"
            );
        }
        Err(rejection) => {
            counter!("trades_rejected_total", "side" => signal.side.as_str()).increment(1);
            tracing::warn!(
                wallet = %signal.wallet_address,
                side = %signal.side,
                token = %signal.token,
                reason = %rejection,
                "Simulated trade rejected"
            );
        }
    }

    result
}
