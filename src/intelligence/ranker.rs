use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::WalletMetrics;

/// Thresholds a wallet must strictly exceed to be copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingCriteria {
    pub min_trade_count: i32,
    /// Percentage, same scale as `WalletMetrics::win_rate`.
    pub target_win_rate: Decimal,
}

impl Default for RankingCriteria {
    fn default() -> Self {
        Self {
            min_trade_count: 50,
            target_win_rate: Decimal::from(60),
        }
    }
}

impl RankingCriteria {
    pub fn admits(&self, wm: &WalletMetrics) -> bool {
        wm.trade_count > self.min_trade_count && wm.win_rate > self.target_win_rate
    }
}

/// Ordering used for top-wallet selection: win rate desc, then average
/// profit pct desc, then address asc.
pub fn compare_wallets(a: &WalletMetrics, b: &WalletMetrics) -> Ordering {
    b.win_rate
        .cmp(&a.win_rate)
        .then_with(|| b.average_profit_pct.cmp(&a.average_profit_pct))
        .then_with(|| a.wallet_address.cmp(&b.wallet_address))
}

/// Filter `population` by `criteria` and return at most `limit` wallets in
/// ranking order.
pub fn rank_wallets(
    population: impl IntoIterator<Item = WalletMetrics>,
    criteria: &RankingCriteria,
    limit: usize,
) -> Vec<WalletMetrics> {
    let mut admitted: Vec<WalletMetrics> = population
        .into_iter()
        .filter(|wm| criteria.admits(wm))
        .collect();

    admitted.sort_by(compare_wallets);
    admitted.truncate(limit);
    admitted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(address: &str, trade_count: i32, win_rate: i64, avg_profit_pct: i64) -> WalletMetrics {
        WalletMetrics {
            wallet_address: address.into(),
            trade_count,
            win_rate: Decimal::from(win_rate),
            average_profit_pct: Decimal::from(avg_profit_pct),
            ..WalletMetrics::default()
        }
    }

    #[test]
    fn test_thresholds_are_strict() {
        let criteria = RankingCriteria::default();
        let population = vec![
            wallet("at_trade_floor", 50, 90, 5),
            wallet("at_win_floor", 200, 60, 5),
            wallet("just_above", 51, 61, 5),
        ];

        let ranked = rank_wallets(population, &criteria, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].wallet_address, "just_above");
    }

    #[test]
    fn test_ordering_and_tie_breaks() {
        let criteria = RankingCriteria::default();
        let population = vec![
            wallet("c", 100, 70, 10),
            wallet("a", 100, 80, 1),
            wallet("d", 100, 70, 20),
            wallet("b", 100, 70, 10),
        ];

        let ranked: Vec<String> = rank_wallets(population, &criteria, 10)
            .into_iter()
            .map(|w| w.wallet_address)
            .collect();

        assert_eq!(ranked, vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_limit_applied_after_ordering() {
        let criteria = RankingCriteria::default();
        let population: Vec<WalletMetrics> = (0..20)
            .map(|i| wallet(&format!("w{i:02}"), 100, 61 + i, 0))
            .collect();

        let ranked = rank_wallets(population, &criteria, 3);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].wallet_address, "w19");
        assert_eq!(ranked[2].wallet_address, "w17");
    }

    #[test]
    fn test_never_returns_wallets_at_or_below_thresholds() {
        let criteria = RankingCriteria {
            min_trade_count: 10,
            target_win_rate: Decimal::from(55),
        };
        let population: Vec<WalletMetrics> = (0..30)
            .flat_map(|tc| (50..60).map(move |wr| wallet(&format!("{tc}-{wr}"), tc, wr, 0)))
            .collect();

        for wm in rank_wallets(population, &criteria, usize::MAX) {
            assert!(wm.trade_count > criteria.min_trade_count);
            assert!(wm.win_rate > criteria.target_win_rate);
        }
    }

    #[test]
    fn test_empty_population() {
        assert!(rank_wallets(Vec::new(), &RankingCriteria::default(), 5).is_empty());
    }
}
