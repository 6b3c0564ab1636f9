use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

use crate::execution::portfolio::DEFAULT_LOG_CAPACITY;
use crate::pricing::jupiter::DEFAULT_JUPITER_PRICE_URL;
use crate::solana::rpc_client::DEFAULT_RPC_URL;

/// Where wallet activity comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    Rpc,
    Fixture,
}

impl FeedMode {
    /// Unknown values fall back to `Rpc`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixture" => Self::Fixture,
            _ => Self::Rpc,
        }
    }
}

/// How holdings are marked to market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSourceKind {
    Ledger,
    Jupiter,
}

impl PriceSourceKind {
    /// Unknown values fall back to `Ledger`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "jupiter" => Self::Jupiter,
            _ => Self::Ledger,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    // Wallet activity
    pub solana_rpc_url: String,
    pub rpc_signature_limit: usize,
    pub feed_mode: FeedMode,
    pub monitored_wallets: Vec<String>,

    // Pricing
    pub price_source: PriceSourceKind,
    pub jupiter_price_url: String,

    // Ranking
    pub target_win_rate: Decimal,
    pub min_trade_count: i32,
    pub top_wallet_limit: usize,

    // Simulation
    pub max_drawdown: Decimal,
    pub initial_balance: Decimal,
    pub cycle_interval_secs: u64,
    pub tx_log_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: database_url_from_env()?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            solana_rpc_url: env::var("SOLANA_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.into()),
            rpc_signature_limit: parse_or("RPC_SIGNATURE_LIMIT", 100),
            feed_mode: FeedMode::parse(&env::var("FEED_MODE").unwrap_or_default()),
            monitored_wallets: parse_wallet_list(&env::var("MONITORED_WALLETS").unwrap_or_default()),

            price_source: PriceSourceKind::parse(&env::var("PRICE_SOURCE").unwrap_or_default()),
            jupiter_price_url: env::var("JUPITER_PRICE_URL")
                .unwrap_or_else(|_| DEFAULT_JUPITER_PRICE_URL.into()),

            target_win_rate: parse_or("TARGET_WIN_RATE", Decimal::from(60)),
            min_trade_count: parse_or("MIN_TRADE_COUNT", 50),
            top_wallet_limit: parse_or("TOP_WALLET_LIMIT", 100),

            max_drawdown: parse_or("MAX_DRAWDOWN", Decimal::from(20)),
            initial_balance: parse_or("INITIAL_BALANCE", Decimal::from(10)),
            cycle_interval_secs: parse_or("CYCLE_INTERVAL_SECS", 300),
            tx_log_capacity: parse_or("TX_LOG_CAPACITY", DEFAULT_LOG_CAPACITY),
        })
    }
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from the `DB_*` parts.
fn database_url_from_env() -> anyhow::Result<String> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return Ok(url);
    }

    let host = env::var("DB_HOST")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL or DB_HOST must be set"))?;
    let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".into());
    let user = env::var("DB_USER").unwrap_or_else(|_| "postgres".into());
    let password = env::var("DB_PASSWORD").unwrap_or_default();
    let name = env::var("DB_NAME").unwrap_or_else(|_| "solcopy".into());

    Ok(compose_database_url(&host, &port, &user, &password, &name))
}

fn compose_database_url(host: &str, port: &str, user: &str, password: &str, name: &str) -> String {
    if password.is_empty() {
        format!("postgres://{user}@{host}:{port}/{name}")
    } else {
        format!("postgres://{user}:{password}@{host}:{port}/{name}")
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => parse_value(&raw, default),
        Err(_) => default,
    }
}

fn parse_value<T: FromStr>(raw: &str, default: T) -> T {
    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(value = %raw, "Invalid numeric config value, using default");
            default
        }
    }
}

/// Split a comma-separated address list, dropping blanks and duplicates
/// while keeping first-seen order.
pub fn parse_wallet_list(raw: &str) -> Vec<String> {
    let mut wallets: Vec<String> = Vec::new();
    for w in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !wallets.iter().any(|seen| seen == w) {
            wallets.push(w.to_string());
        }
    }
    wallets
}
