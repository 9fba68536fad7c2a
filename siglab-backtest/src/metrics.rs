//! Performance metrics over closed trades and the equity curve.
//!
//! Pure functions, defined for empty input: every metric degrades to 0.0
//! (or the profit-factor sentinel) instead of dividing by zero.

use crate::trade::Trade;

/// Sentinel when gross loss is zero but winners exist.
pub const PROFIT_FACTOR_CAP: f64 = 100.0;

pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Mean per-trade return in percent.
pub fn average_return(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.pnl_pct).sum::<f64>() / trades.len() as f64
}

/// Worst peak-to-trough decline as a percent of the peak.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0f64;
    for &equity in equity_curve {
        peak = peak.max(equity);
        if peak > 0.0 {
            worst = worst.max((peak - equity) / peak * 100.0);
        }
    }
    worst
}

/// Annualized Sharpe ratio from per-bar equity returns, zero risk-free rate.
/// Zero when the curve is too short or has no variance.
pub fn sharpe_ratio(equity_curve: &[f64], periods_per_year: f64) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = equity_curve
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance =
        returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    if variance == 0.0 {
        return 0.0;
    }
    mean / variance.sqrt() * periods_per_year.sqrt()
}

/// Gross profit over gross loss. Capped at `PROFIT_FACTOR_CAP` when there
/// are winners but no losers; 0.0 with no winners.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    let gross_profit: f64 = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl < 0.0)
        .map(|t| -t.pnl)
        .sum();
    if gross_loss == 0.0 {
        if gross_profit > 0.0 {
            PROFIT_FACTOR_CAP
        } else {
            0.0
        }
    } else {
        (gross_profit / gross_loss).min(PROFIT_FACTOR_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trade::{ExitReason, TradeDirection};
    use chrono::NaiveDate;

    fn trade(pnl: f64, pnl_pct: f64) -> Trade {
        let t0 = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        Trade {
            entry_index: 0,
            entry_time: t0,
            entry_price: 100.0,
            exit_index: 1,
            exit_time: t0 + chrono::Duration::days(1),
            exit_price: 100.0 + pnl / 10.0,
            direction: TradeDirection::Long,
            quantity: 10.0,
            pnl,
            pnl_pct,
            exit_reason: ExitReason::Timeout,
        }
    }

    #[test]
    fn win_rate_counts_strict_winners() {
        let trades = [trade(50.0, 5.0), trade(-20.0, -2.0), trade(0.0, 0.0)];
        assert!((win_rate(&trades) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_trades_degrade_to_zero() {
        assert_eq!(win_rate(&[]), 0.0);
        assert_eq!(average_return(&[]), 0.0);
        assert_eq!(profit_factor(&[]), 0.0);
    }

    #[test]
    fn max_drawdown_peak_to_trough() {
        // Peak 120, trough 90: 25%.
        let curve = [100.0, 120.0, 90.0, 110.0];
        assert!((max_drawdown(&curve) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn max_drawdown_monotone_curve_is_zero() {
        let curve = [100.0, 101.0, 102.0, 103.0];
        assert_eq!(max_drawdown(&curve), 0.0);
    }

    #[test]
    fn sharpe_flat_curve_is_zero() {
        let curve = [100.0; 50];
        assert_eq!(sharpe_ratio(&curve, 252.0), 0.0);
    }

    #[test]
    fn sharpe_positive_for_steady_gains() {
        // Rising with a small alternating wobble: positive mean return,
        // nonzero variance.
        let curve: Vec<f64> = (0..50)
            .map(|i| 100.0 + i as f64 + if i % 2 == 0 { 0.0 } else { 0.4 })
            .collect();
        assert!(sharpe_ratio(&curve, 252.0) > 0.0);
    }

    #[test]
    fn profit_factor_sentinel_without_losses() {
        let trades = [trade(50.0, 5.0), trade(30.0, 3.0)];
        assert_eq!(profit_factor(&trades), PROFIT_FACTOR_CAP);
    }

    #[test]
    fn profit_factor_ratio() {
        let trades = [trade(60.0, 6.0), trade(-30.0, -3.0)];
        assert!((profit_factor(&trades) - 2.0).abs() < 1e-12);
    }
}
