use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{DailyPnl, Trade, WalletMetrics};

/// Summarize a wallet's trade history.
///
/// Deterministic: the result depends only on the trades themselves, never on
/// wall-clock time, and input order does not matter.
pub fn calculate_wallet_metrics(wallet_address: &str, trades: &[Trade]) -> WalletMetrics {
    let mut wm = WalletMetrics::empty(wallet_address);
    if trades.is_empty() {
        return wm;
    }

    let trade_count = trades.len() as i64;
    let count = Decimal::from(trade_count);

    let mut winners = 0i64;
    let mut losers = 0i64;
    let mut total_profit = Decimal::ZERO;
    let mut total_loss = Decimal::ZERO;
    let mut total_position_size = Decimal::ZERO;
    let mut total_duration = Duration::zero();
    let mut daily: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for trade in trades {
        total_position_size += trade.position_size;
        total_duration += trade.close_time - trade.open_time;

        if trade.is_winner() {
            winners += 1;
            total_profit += trade.profit;
        } else {
            losers += 1;
            total_loss += trade.profit;
        }

        *daily.entry(trade.close_time.date_naive()).or_insert(Decimal::ZERO) += trade.profit;
    }

    let avg_position_size = total_position_size / count;

    wm.trade_count = saturating_count(trades.len());
    wm.win_rate = Decimal::from(winners) * Decimal::ONE_HUNDRED / count;

    if winners > 0 {
        wm.average_profit = total_profit / Decimal::from(winners);
        wm.average_profit_pct = pct_of(wm.average_profit, avg_position_size);
    }

    if losers > 0 {
        wm.average_loss = total_loss / Decimal::from(losers);
        wm.average_loss_pct = pct_of(wm.average_loss, avg_position_size);
    }

    wm.average_position_size = avg_position_size;
    wm.average_trade_duration_secs = total_duration.num_seconds() / trade_count;
    wm.daily_pnl_trend = daily
        .into_iter()
        .map(|(date, pnl)| DailyPnl { date, pnl })
        .collect();

    wm
}

/// Trade count as stored in the `INTEGER` column, clamped at `i32::MAX`.
fn saturating_count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// `value / base * 100`, or zero when `base` is zero.
fn pct_of(value: Decimal, base: Decimal) -> Decimal {
    value
        .checked_div(base)
        .map(|r| r * Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Side;
    use chrono::{TimeZone, Utc};

    fn trade(profit: i64, position_size: i64, close_day: u32, hours_held: i64) -> Trade {
        let close_time = Utc.with_ymd_and_hms(2024, 3, close_day, 12, 0, 0).unwrap();
        Trade {
            open_time: close_time - Duration::hours(hours_held),
            close_time,
            profit: Decimal::from(profit),
            profit_pct: Decimal::ZERO,
            position_size: Decimal::from(position_size),
            action: Side::Buy,
            token: "TOKEN".into(),
            quantity: Decimal::ONE,
            price: Decimal::ONE,
        }
    }

    #[test]
    fn test_empty_trades_yield_zero_metrics() {
        let wm = calculate_wallet_metrics("wallet", &[]);
        assert_eq!(wm, WalletMetrics::empty("wallet"));
        assert_eq!(wm.trade_count, 0);
        assert!(wm.daily_pnl_trend.is_empty());
    }

    #[test]
    fn test_one_winner_one_loser() {
        let trades = vec![trade(15, 200, 1, 1), trade(-5, 200, 1, 1)];
        let wm = calculate_wallet_metrics("wallet", &trades);

        assert_eq!(wm.trade_count, 2);
        assert_eq!(wm.win_rate, Decimal::new(500, 1)); // 50.0
        assert_eq!(wm.average_profit, Decimal::from(15));
        assert_eq!(wm.average_loss, Decimal::from(-5));
        assert_eq!(wm.average_position_size, Decimal::from(200));
        // 15 / 200 * 100
        assert_eq!(wm.average_profit_pct, Decimal::new(75, 1));
        assert_eq!(wm.average_loss_pct, Decimal::new(-25, 1));
    }

    #[test]
    fn test_zero_profit_counts_as_loss() {
        let trades = vec![trade(0, 100, 1, 1), trade(10, 100, 1, 1)];
        let wm = calculate_wallet_metrics("wallet", &trades);
        assert_eq!(wm.win_rate, Decimal::from(50));
        assert_eq!(wm.average_loss, Decimal::ZERO);
        assert_eq!(wm.average_profit, Decimal::from(10));
    }

    #[test]
    fn test_all_winners_leave_loss_fields_zero() {
        let trades = vec![trade(10, 100, 1, 2), trade(30, 100, 2, 4)];
        let wm = calculate_wallet_metrics("wallet", &trades);
        assert_eq!(wm.win_rate, Decimal::ONE_HUNDRED);
        assert_eq!(wm.average_profit, Decimal::from(20));
        assert_eq!(wm.average_loss, Decimal::ZERO);
        assert_eq!(wm.average_loss_pct, Decimal::ZERO);
    }

    #[test]
    fn test_all_losers_leave_profit_fields_zero() {
        let trades = vec![trade(-10, 100, 1, 2), trade(-30, 100, 2, 4)];
        let wm = calculate_wallet_metrics("wallet", &trades);
        assert_eq!(wm.win_rate, Decimal::ZERO);
        assert_eq!(wm.average_profit, Decimal::ZERO);
        assert_eq!(wm.average_profit_pct, Decimal::ZERO);
        assert_eq!(wm.average_loss, Decimal::from(-20));
    }

    #[test]
    fn test_zero_position_size_does_not_divide() {
        let trades = vec![trade(5, 0, 1, 1)];
        let wm = calculate_wallet_metrics("wallet", &trades);
        assert_eq!(wm.average_profit, Decimal::from(5));
        assert_eq!(wm.average_profit_pct, Decimal::ZERO);
    }

    #[test]
    fn test_win_rate_bounded() {
        for pattern in [vec![1, 1, 1], vec![-1, -1], vec![1, -1, 0, 5, -7, 3, 0]] {
            let trades: Vec<Trade> = pattern.iter().map(|&p| trade(p, 10, 1, 1)).collect();
            let wm = calculate_wallet_metrics("wallet", &trades);
            assert!(wm.win_rate >= Decimal::ZERO);
            assert!(wm.win_rate <= Decimal::ONE_HUNDRED);
        }
    }

    #[test]
    fn test_average_duration_in_seconds() {
        let trades = vec![trade(1, 10, 1, 1), trade(1, 10, 1, 3)];
        let wm = calculate_wallet_metrics("wallet", &trades);
        assert_eq!(wm.average_trade_duration_secs, 2 * 3600);
    }

    #[test]
    fn test_daily_pnl_grouped_by_close_date_and_sorted() {
        let trades = vec![
            trade(5, 10, 3, 1),
            trade(10, 10, 1, 1),
            trade(-4, 10, 3, 30), // opened on the 2nd, closed on the 3rd
            trade(2, 10, 1, 1),
        ];
        let wm = calculate_wallet_metrics("wallet", &trades);

        assert_eq!(
            wm.daily_pnl_trend,
            vec![
                DailyPnl {
                    date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    pnl: Decimal::from(12),
                },
                DailyPnl {
                    date: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
                    pnl: Decimal::from(1),
                },
            ]
        );
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut trades = vec![trade(5, 10, 3, 1), trade(-2, 20, 1, 2), trade(7, 30, 2, 5)];
        let forward = calculate_wallet_metrics("wallet", &trades);
        trades.reverse();
        assert_eq!(calculate_wallet_metrics("wallet", &trades), forward);
    }

    #[test]
    fn test_trade_count_saturates() {
        assert_eq!(saturating_count(60), 60);
        assert_eq!(saturating_count(i32::MAX as usize), i32::MAX);
        assert_eq!(saturating_count(usize::MAX), i32::MAX);
    }
}
