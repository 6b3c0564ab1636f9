use axum::extract::State;
use axum::Json;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::execution::performance::collect_performance;
use crate::AppState;

/// Amounts are decimal strings to keep full precision; the percentage is a
/// plain JSON number.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_sol: String,
    pub total_value_sol: String,
    pub profit_loss_sol: String,
    pub profit_loss_pct: f64,
}

pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardSummary> {
    let snap = collect_performance(&state.portfolio, state.prices.as_ref(), state.initial_investment).await;

    Json(DashboardSummary {
        total_sol: snap.total_balance.to_string(),
        total_value_sol: snap.total_value.to_string(),
        profit_loss_sol: snap.profit_loss.to_string(),
        profit_loss_pct: snap.profit_loss_pct.round_dp(4).to_f64().unwrap_or_default(),
    })
}
