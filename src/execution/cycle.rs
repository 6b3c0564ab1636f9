use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::watch;

use crate::db::MetricsStore;
use crate::ingestion::TradeFeed;
use crate::intelligence::{calculate_wallet_metrics, generate_signals, RankingCriteria};
use crate::models::PerformanceSnapshot;
use crate::pricing::PriceSource;

use super::executor::execute_signal;
use super::feedback::{Advisory, FeedbackController};
use super::performance::collect_performance;
use super::portfolio::VirtualPortfolio;

#[derive(Debug, Clone)]
pub struct CycleConfig {
    pub wallets: Vec<String>,
    pub criteria: RankingCriteria,
    pub top_wallet_limit: usize,
    /// Recent fills fetched per selected wallet for signal generation.
    pub recent_trade_limit: usize,
    pub interval: Duration,
    pub initial_investment: Decimal,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            wallets: Vec::new(),
            criteria: RankingCriteria::default(),
            top_wallet_limit: 100,
            recent_trade_limit: 100,
            interval: Duration::from_secs(300),
            initial_investment: Decimal::from(10),
        }
    }
}

/// Outcome of one pass through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub wallets_processed: usize,
    pub wallets_skipped: usize,
    pub selected_wallets: usize,
    pub signals_generated: usize,
    pub trades_executed: usize,
    pub trades_rejected: usize,
    pub performance: PerformanceSnapshot,
    pub advisories: Vec<Advisory>,
}

/// Drives fetch, aggregate, persist, rank, signal, execute and feedback on a
/// fixed period. This is the only writer of the portfolio.
pub struct CycleOrchestrator {
    feed: Arc<dyn TradeFeed>,
    store: Arc<dyn MetricsStore>,
    portfolio: VirtualPortfolio,
    prices: Arc<dyn PriceSource>,
    feedback: FeedbackController,
    config: CycleConfig,
}

impl CycleOrchestrator {
    pub fn new(
        feed: Arc<dyn TradeFeed>,
        store: Arc<dyn MetricsStore>,
        portfolio: VirtualPortfolio,
        prices: Arc<dyn PriceSource>,
        feedback: FeedbackController,
        config: CycleConfig,
    ) -> Self {
        Self {
            feed,
            store,
            portfolio,
            prices,
            feedback,
            config,
        }
    }

    pub fn portfolio(&self) -> &VirtualPortfolio {
        &self.portfolio
    }

    /// Run one full cycle. Failures are contained per wallet; the cycle
    /// always reaches the snapshot and feedback phase.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let started = Instant::now();
        counter!("cycles_total").increment(1);

        let (wallets_processed, wallets_skipped) = self.refresh_wallet_metrics().await;

        let selected = match self
            .store
            .top_wallets(&self.config.criteria, self.config.top_wallet_limit)
            .await
        {
            Ok(wallets) => wallets,
            Err(e) => {
                tracing::error!(error = %e, "Failed to rank wallets, no signals this cycle");
                Vec::new()
            }
        };
        gauge!("selected_wallets").set(selected.len() as f64);
        tracing::info!(selected = selected.len(), "Top wallets selected");

        let signals = generate_signals(&selected, self.feed.as_ref(), self.config.recent_trade_limit).await;

        let mut trades_executed = 0;
        let mut trades_rejected = 0;
        for signal in &signals {
            match execute_signal(&self.portfolio, signal).await {
                Ok(_) => trades_executed += 1,
                Err(_) => trades_rejected += 1,
            }
        }

        let performance =
            collect_performance(&self.portfolio, self.prices.as_ref(), self.config.initial_investment).await;
        gauge!("portfolio_total_value_sol").set(performance.total_value.to_f64().unwrap_or_default());
        gauge!("portfolio_pnl_pct").set(performance.profit_loss_pct.to_f64().unwrap_or_default());

        let advisories = self.feedback.evaluate(&performance);

        histogram!("cycle_duration_seconds").record(started.elapsed().as_secs_f64());
        tracing::info!(
            wallets_processed,
            wallets_skipped,
            signals = signals.len(),
            trades_executed,
            trades_rejected,
            total_value = %performance.total_value,
            pnl_pct = %performance.profit_loss_pct,
            "Cycle complete"
        );

        CycleReport {
            wallets_processed,
            wallets_skipped,
            selected_wallets: selected.len(),
            signals_generated: signals.len(),
            trades_executed,
            trades_rejected,
            performance,
            advisories,
        }
    }

    /// Fetch, aggregate and persist every monitored wallet. Returns
    /// (processed, skipped).
    async fn refresh_wallet_metrics(&self) -> (usize, usize) {
        let mut processed = 0;
        let mut skipped = 0;

        for wallet in &self.config.wallets {
            let trades = match self.feed.fetch_trades(wallet).await {
                Ok(t) => t,
                Err(e) => {
                    counter!("wallet_fetch_failures_total").increment(1);
                    tracing::warn!(error = %e, wallet = %wallet, "Failed to fetch trades, skipping wallet");
                    skipped += 1;
                    continue;
                }
            };

            let wm = calculate_wallet_metrics(wallet, &trades);

            if let Err(e) = self.store.upsert_wallet_metrics(&wm).await {
                counter!("wallet_persist_failures_total").increment(1);
                tracing::warn!(error = %e, wallet = %wallet, "Failed to persist wallet metrics, skipping wallet");
                skipped += 1;
                continue;
            }

            if let Err(e) = self.store.upsert_daily_pnl(wallet, &wm.daily_pnl_trend).await {
                counter!("wallet_persist_failures_total").increment(1);
                tracing::warn!(error = %e, wallet = %wallet, "Failed to persist daily P&L, skipping wallet");
                skipped += 1;
                continue;
            }

            tracing::debug!(
                wallet = %wallet,
                trade_count = wm.trade_count,
                win_rate = %wm.win_rate,
                "Wallet metrics updated"
            );
            processed += 1;
        }

        (processed, skipped)
    }

    /// Loop until `shutdown` flips to true or its sender is dropped.
    /// Shutdown is only observed between cycles. Returns the number of
    /// cycles completed.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> u64 {
        tracing::info!(
            wallets = self.config.wallets.len(),
            interval_secs = self.config.interval.as_secs(),
            "Cycle orchestrator started"
        );

        let mut cycles = 0u64;
        loop {
            if *shutdown.borrow() {
                break;
            }

            self.run_cycle().await;
            cycles += 1;

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!(cycles, "Cycle orchestrator stopped");
        cycles
    }
}
