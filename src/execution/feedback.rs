use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::PerformanceSnapshot;

/// Advisory thresholds, all in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackThresholds {
    /// P&L below this tightens risk (default 0).
    pub loss_pct: Decimal,
    /// P&L above this suggests taking profit (default 10).
    pub take_profit_pct: Decimal,
    /// Drawdown from peak value above this is flagged (default 20).
    pub max_drawdown_pct: Decimal,
}

impl Default for FeedbackThresholds {
    fn default() -> Self {
        Self {
            loss_pct: Decimal::ZERO,
            take_profit_pct: Decimal::from(10),
            max_drawdown_pct: Decimal::from(20),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    TightenRisk { pnl_pct: Decimal },
    TakeProfit { pnl_pct: Decimal },
    MaxDrawdownBreached { drawdown_pct: Decimal, limit_pct: Decimal },
}

/// Turns each cycle's performance snapshot into advisories.
///
/// Advisories are only logged; nothing here changes how the next cycle
/// trades.
#[derive(Debug, Clone)]
pub struct FeedbackController {
    thresholds: FeedbackThresholds,
    peak_value: Option<Decimal>,
}

impl FeedbackController {
    pub fn new(thresholds: FeedbackThresholds) -> Self {
        Self {
            thresholds,
            peak_value: None,
        }
    }

    pub fn evaluate(&mut self, snapshot: &PerformanceSnapshot) -> Vec<Advisory> {
        let mut advisories = Vec::new();
        let pnl_pct = snapshot.profit_loss_pct;

        if pnl_pct < self.thresholds.loss_pct {
            tracing::warn!(pnl_pct = %pnl_pct, "Portfolio is in loss. Tightening risk controls.");
            advisories.push(Advisory::TightenRisk { pnl_pct });
        }

        if pnl_pct > self.thresholds.take_profit_pct {
            tracing::info!(
                pnl_pct = %pnl_pct,
                threshold = %self.thresholds.take_profit_pct,
                "Portfolio profit above threshold. Consider taking some profits."
            );
            advisories.push(Advisory::TakeProfit { pnl_pct });
        }

        let peak = self
            .peak_value
            .map_or(snapshot.total_value, |p| p.max(snapshot.total_value));
        self.peak_value = Some(peak);

        if peak > Decimal::ZERO {
            let drawdown_pct = (peak - snapshot.total_value) / peak * Decimal::ONE_HUNDRED;
            if drawdown_pct > self.thresholds.max_drawdown_pct {
                tracing::warn!(
                    drawdown_pct = %drawdown_pct,
                    limit_pct = %self.thresholds.max_drawdown_pct,
                    peak_value = %peak,
                    "Portfolio drawdown exceeds limit"
                );
                advisories.push(Advisory::MaxDrawdownBreached {
                    drawdown_pct,
                    limit_pct: self.thresholds.max_drawdown_pct,
                });
            }
        }

        advisories
    }

    pub fn peak_value(&self) -> Option<Decimal> {
        self.peak_value
    }
}
