use sqlx::PgPool;

use crate::intelligence::RankingCriteria;
use crate::models::{DailyPnl, WalletMetrics};

/// Insert or overwrite the metrics row for a wallet.
pub async fn upsert_wallet_metrics(pool: &PgPool, wm: &WalletMetrics) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO wallet_metrics (
            wallet_address, trade_count, win_rate, average_profit,
            average_profit_pct, average_loss, average_loss_pct,
            average_position_size, average_trade_duration_secs
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (wallet_address) DO UPDATE SET
            trade_count = EXCLUDED.trade_count,
            win_rate = EXCLUDED.win_rate,
            average_profit = EXCLUDED.average_profit,
            average_profit_pct = EXCLUDED.average_profit_pct,
            average_loss = EXCLUDED.average_loss,
            average_loss_pct = EXCLUDED.average_loss_pct,
            average_position_size = EXCLUDED.average_position_size,
            average_trade_duration_secs = EXCLUDED.average_trade_duration_secs,
            updated_at = NOW()
        "#,
    )
    .bind(&wm.wallet_address)
    .bind(wm.trade_count)
    .bind(wm.win_rate)
    .bind(wm.average_profit)
    .bind(wm.average_profit_pct)
    .bind(wm.average_loss)
    .bind(wm.average_loss_pct)
    .bind(wm.average_position_size)
    .bind(wm.average_trade_duration_secs)
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert or overwrite daily P&L rows, keyed by (wallet, date). All rows are
/// written in one transaction.
pub async fn upsert_daily_pnl(pool: &PgPool, wallet_address: &str, trend: &[DailyPnl]) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    for day in trend {
        sqlx::query(
            r#"
            INSERT INTO daily_pnl_trend (wallet_address, date, pnl)
            VALUES ($1, $2, $3)
            ON CONFLICT (wallet_address, date) DO UPDATE SET pnl = EXCLUDED.pnl
            "#,
        )
        .bind(wallet_address)
        .bind(day.date)
        .bind(day.pnl)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Wallets strictly above both thresholds, best first.
pub async fn select_top_wallets(
    pool: &PgPool,
    criteria: &RankingCriteria,
    limit: i64,
) -> anyhow::Result<Vec<WalletMetrics>> {
    let wallets = sqlx::query_as::<_, WalletMetrics>(
        r#"
        SELECT wallet_address, trade_count, win_rate, average_profit,
               average_profit_pct, average_loss, average_loss_pct,
               average_position_size, average_trade_duration_secs
        FROM wallet_metrics
        WHERE trade_count > $1 AND win_rate > $2
        ORDER BY win_rate DESC, average_profit_pct DESC, wallet_address COLLATE "C" ASC
        LIMIT $3
        "#,
    )
    .bind(criteria.min_trade_count)
    .bind(criteria.target_win_rate)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(wallets)
}

/// Daily P&L history for one wallet, oldest first.
pub async fn get_daily_pnl(pool: &PgPool, wallet_address: &str) -> anyhow::Result<Vec<DailyPnl>> {
    let rows = sqlx::query_as::<_, DailyPnl>(
        "SELECT date, pnl FROM daily_pnl_trend WHERE wallet_address = $1 ORDER BY date ASC",
    )
    .bind(wallet_address)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch one wallet's metrics together with its daily P&L trend.
pub async fn get_wallet_metrics(pool: &PgPool, wallet_address: &str) -> anyhow::Result<Option<WalletMetrics>> {
    let row = sqlx::query_as::<_, WalletMetrics>(
        r#"
        SELECT wallet_address, trade_count, win_rate, average_profit,
               average_profit_pct, average_loss, average_loss_pct,
               average_position_size, average_trade_duration_secs
        FROM wallet_metrics
        WHERE wallet_address = $1
        "#,
    )
    .bind(wallet_address)
    .fetch_optional(pool)
    .await?;

    let Some(mut wm) = row else {
        return Ok(None);
    };
    wm.daily_pnl_trend = get_daily_pnl(pool, wallet_address).await?;
    Ok(Some(wm))
}
