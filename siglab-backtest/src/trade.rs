//! Trade records and the aggregate backtest result.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    Stop,
    Target,
    SignalReversal,
    Timeout,
}

/// One completed round trip. Indices refer to the cleaned bar series the
/// engine actually replayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub entry_index: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_index: usize,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub direction: TradeDirection,
    pub quantity: f64,
    pub pnl: f64,
    /// Return on the capital committed at entry, in percent.
    pub pnl_pct: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn holding_bars(&self) -> usize {
        self.exit_index - self.entry_index
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub total_trades: usize,
    pub win_rate: f64,
    pub average_return: f64,
    /// Worst peak-to-trough equity decline, in percent of the peak.
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub profit_factor: f64,
    /// Mark-to-market equity per replayed bar.
    pub equity_curve: Vec<f64>,
    pub final_equity: f64,
    /// Recoverable anomalies encountered during the run (skipped bars).
    pub notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn trade_json_roundtrip() {
        let t0 = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        let trade = Trade {
            entry_index: 3,
            entry_time: t0,
            entry_price: 100.0,
            exit_index: 7,
            exit_time: t0 + chrono::Duration::days(4),
            exit_price: 104.0,
            direction: TradeDirection::Long,
            quantity: 50.0,
            pnl: 200.0,
            pnl_pct: 4.0,
            exit_reason: ExitReason::Target,
        };
        let json = serde_json::to_string(&trade).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(back.exit_reason, ExitReason::Target);
        assert_eq!(back.holding_bars(), 4);
        assert!(back.is_winner());
    }
}
