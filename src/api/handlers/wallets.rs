use axum::extract::{Path, State};
use axum::Json;

use crate::errors::AppError;
use crate::models::WalletMetrics;
use crate::AppState;

pub async fn detail(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<WalletMetrics>, AppError> {
    let wm = state
        .store
        .wallet_metrics(&address)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Wallet {address} not found")))?;

    Ok(Json(wm))
}
