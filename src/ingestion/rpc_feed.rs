use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{Side, Trade};
use crate::solana::{extract_swap_fill, SolanaRpcClient, SwapFill};

use super::{FeedError, TradeFeed};

/// Trade feed backed by a Solana RPC node.
///
/// Each cycle it pulls the wallet's latest signatures, loads every
/// transaction and keeps the ones that reduce to a SOL <-> token swap.
#[derive(Debug, Clone)]
pub struct RpcTradeFeed {
    client: SolanaRpcClient,
    signature_limit: usize,
}

impl RpcTradeFeed {
    pub fn new(client: SolanaRpcClient, signature_limit: usize) -> Self {
        Self {
            client,
            signature_limit,
        }
    }

    /// Swap fills for `wallet`, oldest first.
    async fn fetch_fills(&self, wallet: &str, limit: usize) -> Result<Vec<SwapFill>, FeedError> {
        let signatures = self.client.get_signatures_for_address(wallet, limit).await?;

        let mut fills = Vec::new();
        for sig in signatures.iter().filter(|s| s.err.is_none()) {
            let tx = match self.client.get_transaction(&sig.signature).await {
                Ok(Some(tx)) => tx,
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!(
                        error = %e,
                        wallet = %wallet,
                        signature = %sig.signature,
                        "Failed to fetch transaction details, skipping"
                    );
                    continue;
                }
            };

            if let Some(fill) = extract_swap_fill(wallet, &tx) {
                fills.push(fill);
            }
        }

        fills.sort_by_key(|f| f.timestamp);
        tracing::debug!(
            wallet = %wallet,
            signatures = signatures.len(),
            fills = fills.len(),
            "Fetched swap fills"
        );
        Ok(fills)
    }
}

#[async_trait::async_trait]
impl TradeFeed for RpcTradeFeed {
    async fn fetch_trades(&self, wallet: &str) -> Result<Vec<Trade>, FeedError> {
        let fills = self.fetch_fills(wallet, self.signature_limit).await?;
        Ok(round_trips(&fills))
    }

    async fn fetch_recent_trades(&self, wallet: &str, limit: usize) -> Result<Vec<Trade>, FeedError> {
        let fills = self.fetch_fills(wallet, limit.min(self.signature_limit)).await?;
        Ok(fills.iter().map(fill_as_trade).collect())
    }
}

/// Open quantity of one token and what it cost.
struct Lot {
    quantity: Decimal,
    cost: Decimal,
    opened_at: DateTime<Utc>,
}

/// Replay chronological fills into closed long positions.
///
/// Buys accumulate into an average-cost lot per token. Each sell closes up to
/// the lot's open quantity and yields one trade whose price is the average
/// entry and whose profit is proceeds minus cost basis. Sells of tokens with
/// no observed buy are ignored.
pub fn round_trips(fills: &[SwapFill]) -> Vec<Trade> {
    let mut lots: HashMap<&str, Lot> = HashMap::new();
    let mut trades = Vec::new();

    for fill in fills {
        match fill.side {
            Side::Buy => {
                let lot = lots.entry(fill.mint.as_str()).or_insert(Lot {
                    quantity: Decimal::ZERO,
                    cost: Decimal::ZERO,
                    opened_at: fill.timestamp,
                });
                lot.quantity += fill.quantity;
                lot.cost += fill.quantity * fill.price;
            }
            Side::Sell => {
                let Some(lot) = lots.get_mut(fill.mint.as_str()) else {
                    continue;
                };

                let matched = fill.quantity.min(lot.quantity);
                if matched.is_zero() {
                    continue;
                }

                let avg_cost = lot.cost / lot.quantity;
                let cost_basis = if matched == lot.quantity { lot.cost } else { avg_cost * matched };
                let profit = matched * fill.price - cost_basis;
                let profit_pct = profit
                    .checked_div(cost_basis)
                    .map(|r| r * Decimal::ONE_HUNDRED)
                    .unwrap_or(Decimal::ZERO);

                trades.push(Trade {
                    open_time: lot.opened_at,
                    close_time: fill.timestamp,
                    profit,
                    profit_pct,
                    position_size: cost_basis,
                    action: Side::Buy,
                    token: fill.mint.clone(),
                    quantity: matched,
                    price: avg_cost,
                });

                lot.quantity -= matched;
                lot.cost -= cost_basis;
                if lot.quantity.is_zero() {
                    lots.remove(fill.mint.as_str());
                }
            }
        }
    }

    trades
}

fn fill_as_trade(fill: &SwapFill) -> Trade {
    Trade {
        open_time: fill.timestamp,
        close_time: fill.timestamp,
        profit: Decimal::ZERO,
        profit_pct: Decimal::ZERO,
        position_size: fill.quantity * fill.price,
        action: fill.side,
        token: fill.mint.clone(),
        quantity: fill.quantity,
        price: fill.price,
    }
}
