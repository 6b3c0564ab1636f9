use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Transaction;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PortfolioView {
    pub balance: Decimal,
    pub holdings: BTreeMap<String, Decimal>,
    pub total_transactions: u64,
}

pub async fn portfolio(State(state): State<AppState>) -> Json<PortfolioView> {
    let snap = state.portfolio.snapshot().await;

    Json(PortfolioView {
        balance: snap.balance,
        holdings: snap.holdings.into_iter().collect(),
        total_transactions: snap.total_transactions,
    })
}

/// Retained ledger entries, oldest first.
pub async fn transactions(State(state): State<AppState>) -> Json<Vec<Transaction>> {
    Json(state.portfolio.transactions().await)
}
