pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod execution;
pub mod ingestion;
pub mod intelligence;
pub mod metrics;
pub mod models;
pub mod pricing;
pub mod solana;

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::db::MetricsStore;
use crate::execution::VirtualPortfolio;
use crate::pricing::PriceSource;

/// Shared read-side state for the HTTP layer. The cycle task holds its own
/// handle to the same portfolio.
#[derive(Clone)]
pub struct AppState {
    pub portfolio: VirtualPortfolio,
    pub prices: Arc<dyn PriceSource>,
    pub store: Arc<dyn MetricsStore>,
    pub initial_investment: Decimal,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
