pub mod aggregator;
pub mod ranker;
pub mod signals;

pub use aggregator::calculate_wallet_metrics;
pub use ranker::{rank_wallets, RankingCriteria};
pub use signals::{generate_signals, signals_from_trades};
