use std::sync::Mutex;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Install the Prometheus exporter and register all application metrics.
/// The recorder is process-global; later calls return the handle from the
/// first successful install.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let mut slot = HANDLE
        .lock()
        .map_err(|_| anyhow::anyhow!("metrics handle lock poisoned"))?;
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("cycles_total").absolute(0);
    counter!("wallet_fetch_failures_total").absolute(0);
    counter!("wallet_persist_failures_total").absolute(0);
    counter!("signals_generated_total").absolute(0);
    for side in ["buy", "sell"] {
        counter!("trades_executed_total", "side" => side).absolute(0);
        counter!("trades_rejected_total", "side" => side).absolute(0);
    }

    gauge!("portfolio_total_value_sol").set(0.0);
    gauge!("portfolio_pnl_pct").set(0.0);
    gauge!("selected_wallets").set(0.0);

    // Histogram is lazily created on first record; force creation.
    histogram!("cycle_duration_seconds").record(0.0);

    *slot = Some(handle.clone());
    Ok(handle)
}
