use metrics::counter;

use crate::ingestion::TradeFeed;
use crate::models::{Trade, TradeSignal, WalletMetrics};

/// One signal per trade, in source order.
pub fn signals_from_trades(wallet_address: &str, trades: &[Trade]) -> Vec<TradeSignal> {
    trades
        .iter()
        .map(|trade| TradeSignal {
            wallet_address: wallet_address.to_string(),
            side: trade.action,
            token: trade.token.clone(),
            quantity: trade.quantity,
            price: trade.price,
        })
        .collect()
}

/// Fetch each selected wallet's recent activity and turn it into signals.
/// A wallet whose fetch fails contributes nothing this cycle.
pub async fn generate_signals(
    wallets: &[WalletMetrics],
    feed: &dyn TradeFeed,
    recent_limit: usize,
) -> Vec<TradeSignal> {
    let mut signals = Vec::new();

    for wallet in wallets {
        let trades = match feed.fetch_recent_trades(&wallet.wallet_address, recent_limit).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    wallet = %wallet.wallet_address,
                    "Signal generation: failed to fetch recent trades, skipping wallet"
                );
                continue;
            }
        };

        let wallet_signals = signals_from_trades(&wallet.wallet_address, &trades);
        tracing::debug!(
            wallet = %wallet.wallet_address,
            signals = wallet_signals.len(),
            "Signals generated"
        );
        signals.extend(wallet_signals);
    }

    counter!("signals_generated_total").increment(signals.len() as u64);
    signals
}
