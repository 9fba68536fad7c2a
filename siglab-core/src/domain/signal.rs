//! Trading signal — the scored output of one generator invocation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Trading decision carried by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

/// Stop-loss and take-profit levels attached to an actionable signal.
///
/// Take-profits are monotone: increasing for a buy, decreasing for a sell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitPlan {
    pub stop_loss: f64,
    pub take_profits: Vec<f64>,
    /// Distance to the first take-profit divided by the stop distance.
    /// Always > 0.
    pub risk_reward_ratio: f64,
}

/// A scored trading signal for the latest bar of a series.
///
/// Stateless: the generator holds no memory between calls; everything here
/// is re-derived from the input bars on each invocation. Hold signals carry
/// no exit plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: NaiveDateTime,
    pub action: Action,
    /// Saturating 0-100 scale mapped from the net rule score.
    pub strength: f64,
    /// Fraction of the total enabled rule weight that agreed, in [0, 1].
    pub confidence: f64,
    pub entry_price: f64,
    pub exit: Option<ExitPlan>,
    /// Names of the rules that fired, in evaluation order.
    pub contributing: Vec<String>,
}

impl Signal {
    pub fn is_actionable(&self) -> bool {
        self.action != Action::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn signal_serialization_roundtrip() {
        let signal = Signal {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(15, 0, 0)
                .unwrap(),
            action: Action::Buy,
            strength: 62.5,
            confidence: 0.7,
            entry_price: 101.5,
            exit: Some(ExitPlan {
                stop_loss: 99.5,
                take_profits: vec![103.5, 105.5, 107.5],
                risk_reward_ratio: 1.0,
            }),
            contributing: vec!["rsi_oversold_recovery".into(), "price_above_vwap".into()],
        };
        let json = serde_json::to_string(&signal).unwrap();
        let deser: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(signal.action, deser.action);
        assert_eq!(signal.contributing, deser.contributing);
        assert!(deser.is_actionable());
    }

    #[test]
    fn hold_is_not_actionable() {
        let signal = Signal {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(15, 0, 0)
                .unwrap(),
            action: Action::Hold,
            strength: 10.0,
            confidence: 0.1,
            entry_price: 100.0,
            exit: None,
            contributing: vec![],
        };
        assert!(!signal.is_actionable());
    }
}
