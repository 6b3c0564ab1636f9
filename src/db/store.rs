use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::intelligence::{rank_wallets, RankingCriteria};
use crate::models::{DailyPnl, WalletMetrics};

use super::wallet_metrics_repo;

/// Persistence for per-wallet metrics. Writes are last-write-wins.
#[async_trait::async_trait]
pub trait MetricsStore: Send + Sync {
    async fn upsert_wallet_metrics(&self, wm: &WalletMetrics) -> anyhow::Result<()>;

    async fn upsert_daily_pnl(&self, wallet_address: &str, trend: &[DailyPnl]) -> anyhow::Result<()>;

    /// Wallets admitted by `criteria`, in ranking order, at most `limit`.
    async fn top_wallets(&self, criteria: &RankingCriteria, limit: usize) -> anyhow::Result<Vec<WalletMetrics>>;

    async fn wallet_metrics(&self, wallet_address: &str) -> anyhow::Result<Option<WalletMetrics>>;

    /// Cheap connectivity check for health probes.
    async fn ping(&self) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgMetricsStore {
    pool: PgPool,
}

impl PgMetricsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MetricsStore for PgMetricsStore {
    async fn upsert_wallet_metrics(&self, wm: &WalletMetrics) -> anyhow::Result<()> {
        wallet_metrics_repo::upsert_wallet_metrics(&self.pool, wm).await
    }

    async fn upsert_daily_pnl(&self, wallet_address: &str, trend: &[DailyPnl]) -> anyhow::Result<()> {
        wallet_metrics_repo::upsert_daily_pnl(&self.pool, wallet_address, trend).await
    }

    async fn top_wallets(&self, criteria: &RankingCriteria, limit: usize) -> anyhow::Result<Vec<WalletMetrics>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        wallet_metrics_repo::select_top_wallets(&self.pool, criteria, limit).await
    }

    async fn wallet_metrics(&self, wallet_address: &str) -> anyhow::Result<Option<WalletMetrics>> {
        wallet_metrics_repo::get_wallet_metrics(&self.pool, wallet_address).await
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local store with the same semantics as the Postgres one.
#[derive(Default)]
pub struct InMemoryMetricsStore {
    metrics: RwLock<HashMap<String, WalletMetrics>>,
    daily: RwLock<HashMap<String, BTreeMap<NaiveDate, Decimal>>>,
}

impl InMemoryMetricsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl MetricsStore for InMemoryMetricsStore {
    async fn upsert_wallet_metrics(&self, wm: &WalletMetrics) -> anyhow::Result<()> {
        let mut row = wm.clone();
        row.daily_pnl_trend.clear();
        self.metrics.write().await.insert(wm.wallet_address.clone(), row);
        Ok(())
    }

    async fn upsert_daily_pnl(&self, wallet_address: &str, trend: &[DailyPnl]) -> anyhow::Result<()> {
        if !self.metrics.read().await.contains_key(wallet_address) {
            anyhow::bail!("no wallet_metrics row for {wallet_address}");
        }

        let mut daily = self.daily.write().await;
        let days = daily.entry(wallet_address.to_string()).or_default();
        for day in trend {
            days.insert(day.date, day.pnl);
        }
        Ok(())
    }

    async fn top_wallets(&self, criteria: &RankingCriteria, limit: usize) -> anyhow::Result<Vec<WalletMetrics>> {
        let population: Vec<WalletMetrics> = self.metrics.read().await.values().cloned().collect();
        Ok(rank_wallets(population, criteria, limit))
    }

    async fn wallet_metrics(&self, wallet_address: &str) -> anyhow::Result<Option<WalletMetrics>> {
        let Some(mut wm) = self.metrics.read().await.get(wallet_address).cloned() else {
            return Ok(None);
        };
        if let Some(days) = self.daily.read().await.get(wallet_address) {
            wm.daily_pnl_trend = days
                .iter()
                .map(|(date, pnl)| DailyPnl { date: *date, pnl: *pnl })
                .collect();
        }
        Ok(Some(wm))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
