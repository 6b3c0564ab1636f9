use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::Side;

use super::types::{ParsedTransaction, TokenBalance, LAMPORTS_PER_SOL_SCALE, WRAPPED_SOL_MINT};

/// A wallet's net SOL-for-token exchange within one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapFill {
    pub timestamp: DateTime<Utc>,
    pub side: Side,
    pub mint: String,
    pub quantity: Decimal,
    /// SOL per token.
    pub price: Decimal,
}

fn lamports_to_sol(lamports: i128) -> Decimal {
    Decimal::try_from_i128_with_scale(lamports, LAMPORTS_PER_SOL_SCALE).unwrap_or(Decimal::ZERO)
}

fn token_amount(balance: &TokenBalance) -> Option<Decimal> {
    let raw: i128 = balance.ui_token_amount.amount.parse().ok()?;
    Decimal::try_from_i128_with_scale(raw, balance.ui_token_amount.decimals).ok()
}

/// Per-mint balance of token accounts owned by `wallet`.
fn owned_balances(balances: &[TokenBalance], wallet: &str) -> HashMap<String, Decimal> {
    let mut out: HashMap<String, Decimal> = HashMap::new();
    for b in balances.iter().filter(|b| b.owner.as_deref() == Some(wallet)) {
        if let Some(amount) = token_amount(b) {
            *out.entry(b.mint.clone()).or_insert(Decimal::ZERO) += amount;
        }
    }
    out
}

/// Reduce a confirmed transaction to a swap fill for `wallet`.
///
/// Returns `None` for failed transactions, transactions the wallet is not
/// part of, and anything that is not a plain SOL <-> token exchange.
pub fn extract_swap_fill(wallet: &str, tx: &ParsedTransaction) -> Option<SwapFill> {
    let meta = tx.meta.as_ref()?;
    if meta.err.is_some() {
        return None;
    }
    let timestamp = DateTime::from_timestamp(tx.block_time?, 0)?;

    let index = tx
        .transaction
        .message
        .account_keys
        .iter()
        .position(|k| k.pubkey == wallet)?;

    let pre = i128::from(*meta.pre_balances.get(index)?);
    let post = i128::from(*meta.post_balances.get(index)?);
    // The fee payer is always account 0; the fee is not part of the trade.
    let fee = if index == 0 { i128::from(meta.fee) } else { 0 };
    let mut sol_delta = lamports_to_sol(post - pre + fee);

    let before = owned_balances(&meta.pre_token_balances, wallet);
    let after = owned_balances(&meta.post_token_balances, wallet);

    let mut token_deltas: Vec<(String, Decimal)> = Vec::new();
    for mint in before.keys().chain(after.keys()) {
        if token_deltas.iter().any(|(m, _)| m == mint) {
            continue;
        }
        let delta = after.get(mint).copied().unwrap_or(Decimal::ZERO)
            - before.get(mint).copied().unwrap_or(Decimal::ZERO);
        if delta.is_zero() {
            continue;
        }
        if mint == WRAPPED_SOL_MINT {
            sol_delta += delta;
        } else {
            token_deltas.push((mint.clone(), delta));
        }
    }

    // Largest token movement wins; ties broken by mint for determinism.
    token_deltas.sort_by(|a, b| b.1.abs().cmp(&a.1.abs()).then_with(|| a.0.cmp(&b.0)));
    let (mint, token_delta) = token_deltas.into_iter().next()?;

    let side = if token_delta > Decimal::ZERO && sol_delta < Decimal::ZERO {
        Side::Buy
    } else if token_delta < Decimal::ZERO && sol_delta > Decimal::ZERO {
        Side::Sell
    } else {
        return None;
    };

    let quantity = token_delta.abs();
    let price = sol_delta.abs().checked_div(quantity)?;

    Some(SwapFill {
        timestamp,
        side,
        mint,
        quantity,
        price,
    })
}
