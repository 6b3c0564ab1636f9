use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use solcopy::api::router::create_router;
use solcopy::config::{AppConfig, FeedMode, PriceSourceKind};
use solcopy::db::{self, MetricsStore, PgMetricsStore};
use solcopy::execution::{CycleConfig, CycleOrchestrator, FeedbackController, FeedbackThresholds, VirtualPortfolio};
use solcopy::ingestion::{FixtureTradeFeed, RpcTradeFeed, TradeFeed};
use solcopy::intelligence::RankingCriteria;
use solcopy::pricing::{JupiterPriceSource, LedgerPriceSource, PriceSource};
use solcopy::solana::SolanaRpcClient;
use solcopy::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let metrics_handle = solcopy::metrics::init_metrics()?;

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url).await?;
    tracing::info!("Database connected");
    let store: Arc<dyn MetricsStore> = Arc::new(PgMetricsStore::new(pool));

    let http = reqwest::Client::new();

    let feed: Arc<dyn TradeFeed> = match config.feed_mode {
        FeedMode::Rpc => {
            tracing::info!(rpc_url = %config.solana_rpc_url, "Using Solana RPC trade feed");
            let client = SolanaRpcClient::new(http.clone(), config.solana_rpc_url.clone());
            Arc::new(RpcTradeFeed::new(client, config.rpc_signature_limit))
        }
        FeedMode::Fixture => {
            tracing::warn!("FEED_MODE=fixture: using synthetic wallet activity");
            Arc::new(FixtureTradeFeed::demo(&config.monitored_wallets, Utc::now()))
        }
    };

    if config.monitored_wallets.is_empty() {
        tracing::warn!("MONITORED_WALLETS is empty: cycles will select no wallets");
    }

    let portfolio = VirtualPortfolio::with_log_capacity(config.initial_balance, config.tx_log_capacity);

    let prices: Arc<dyn PriceSource> = match config.price_source {
        PriceSourceKind::Ledger => Arc::new(LedgerPriceSource::new(portfolio.clone())),
        PriceSourceKind::Jupiter => {
            tracing::info!(url = %config.jupiter_price_url, "Marking holdings with Jupiter prices");
            Arc::new(JupiterPriceSource::new(http.clone(), config.jupiter_price_url.clone()))
        }
    };

    let thresholds = FeedbackThresholds {
        max_drawdown_pct: config.max_drawdown,
        ..FeedbackThresholds::default()
    };
    let cycle_config = CycleConfig {
        wallets: config.monitored_wallets.clone(),
        criteria: RankingCriteria {
            min_trade_count: config.min_trade_count,
            target_win_rate: config.target_win_rate,
        },
        top_wallet_limit: config.top_wallet_limit,
        recent_trade_limit: config.rpc_signature_limit,
        interval: Duration::from_secs(config.cycle_interval_secs),
        initial_investment: config.initial_balance,
    };

    let orchestrator = CycleOrchestrator::new(
        feed,
        store.clone(),
        portfolio.clone(),
        prices.clone(),
        FeedbackController::new(thresholds),
        cycle_config,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let cycle_handle = tokio::spawn(orchestrator.run(shutdown_rx));

    tracing::info!(
        initial_balance = %config.initial_balance,
        wallets = config.monitored_wallets.len(),
        interval_secs = config.cycle_interval_secs,
        "Cycle orchestrator spawned"
    );

    let state = AppState {
        portfolio,
        prices,
        store,
        initial_investment: config.initial_balance,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown requested, finishing current cycle");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    match cycle_handle.await {
        Ok(cycles) => tracing::info!(cycles, "Shutdown complete"),
        Err(e) => tracing::error!(error = %e, "Cycle task ended abnormally"),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
