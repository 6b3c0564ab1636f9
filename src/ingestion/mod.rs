pub mod fixture;
pub mod rpc_feed;

pub use fixture::FixtureTradeFeed;
pub use rpc_feed::RpcTradeFeed;

use thiserror::Error;

use crate::models::Trade;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("unexpected response: {0}")]
    Unexpected(String),

    #[error("feed unavailable for wallet {0}")]
    Unavailable(String),
}

/// Source of observed wallet activity.
#[async_trait::async_trait]
pub trait TradeFeed: Send + Sync {
    /// Closed trades with realized profit, used for wallet metrics.
    async fn fetch_trades(&self, wallet: &str) -> Result<Vec<Trade>, FeedError>;

    /// The wallet's most recent trades in chronological order, used to
    /// derive signals. At most `limit` entries.
    async fn fetch_recent_trades(&self, wallet: &str, limit: usize) -> Result<Vec<Trade>, FeedError>;
}
