//! Signal scoring and exit planning.
//!
//! Enabled rules vote with their weights; the net bullish-minus-bearish
//! score maps through a saturating tanh onto [-100, 100]. Scores past the
//! action threshold become Buy/Sell with an exit plan, everything else is
//! Hold with none.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::registry::Strategy;
use super::rules::{Polarity, RuleContext};
use crate::domain::{Action, Bar, ExitPlan, LevelAnalysis, LevelKind, Signal};
use crate::error::AnalysisError;
use crate::indicators::IndicatorSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Mapped-score magnitude required for Buy/Sell (on the 0..100 scale).
    pub action_threshold: f64,
    /// Net-weight scale fed to tanh; larger means harder to saturate.
    pub score_scale: f64,
    /// ATR multiple for the stop-distance candidate.
    pub atr_multiplier: f64,
    /// Floor for the stop distance, in percent of entry (0.5 = 0.5%).
    pub min_risk_pct: f64,
    /// Take-profit distances as multiples of the stop distance.
    pub take_profit_multiples: Vec<f64>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            action_threshold: 30.0,
            score_scale: 4.0,
            atr_multiplier: 1.5,
            min_risk_pct: 0.5,
            take_profit_multiples: vec![1.0, 2.0, 3.0],
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(0.0..=100.0).contains(&self.action_threshold) {
            return Err(AnalysisError::invalid_config(
                "action_threshold must be in [0, 100]",
            ));
        }
        if self.score_scale <= 0.0 {
            return Err(AnalysisError::invalid_config("score_scale must be positive"));
        }
        if self.atr_multiplier <= 0.0 {
            return Err(AnalysisError::invalid_config(
                "atr_multiplier must be positive",
            ));
        }
        if self.min_risk_pct <= 0.0 {
            return Err(AnalysisError::invalid_config("min_risk_pct must be positive"));
        }
        if self.take_profit_multiples.is_empty() {
            return Err(AnalysisError::invalid_config(
                "take_profit_multiples cannot be empty",
            ));
        }
        let mut prev = 0.0;
        for &m in &self.take_profit_multiples {
            if m <= prev {
                return Err(AnalysisError::invalid_config(
                    "take_profit_multiples must be positive and increasing",
                ));
            }
            prev = m;
        }
        Ok(())
    }
}

pub struct SignalEngine;

impl SignalEngine {
    /// Score the latest bar of the series.
    pub fn generate(
        bars: &[Bar],
        indicators: &IndicatorSet,
        levels: &LevelAnalysis,
        strategy: &Strategy,
        config: &SignalConfig,
    ) -> Result<Signal, AnalysisError> {
        if bars.is_empty() {
            return Err(AnalysisError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        Self::evaluate_at(bars, indicators, levels, strategy, config, bars.len() - 1)
    }

    /// Score an arbitrary bar index. Only positions `<= index` are read, so
    /// replaying a series index by index sees exactly what was knowable at
    /// each step.
    pub fn evaluate_at(
        bars: &[Bar],
        indicators: &IndicatorSet,
        levels: &LevelAnalysis,
        strategy: &Strategy,
        config: &SignalConfig,
        index: usize,
    ) -> Result<Signal, AnalysisError> {
        config.validate()?;
        if index >= bars.len() {
            return Err(AnalysisError::integrity(index, "index out of range"));
        }
        if indicators.len() != bars.len() {
            return Err(AnalysisError::invalid_config(
                "indicator set length does not match bar series",
            ));
        }

        let ctx = RuleContext {
            bars,
            indicators,
            levels,
            index,
        };

        let mut bullish = 0.0;
        let mut bearish = 0.0;
        let mut confirming = 0.0;
        let mut contributing = Vec::new();
        for (rule, weight) in strategy.rules() {
            if !(rule.predicate)(&ctx) {
                continue;
            }
            contributing.push(rule.name.to_string());
            match rule.polarity {
                Polarity::Bullish => bullish += weight,
                Polarity::Bearish => bearish += weight,
                Polarity::Confirming => confirming += weight,
            }
        }
        // Confirming weight reinforces whichever side already leads.
        if bullish > bearish {
            bullish += confirming;
        } else if bearish > bullish {
            bearish += confirming;
        }

        let net = bullish - bearish;
        let mapped = 100.0 * (net / config.score_scale).tanh();
        let action = if mapped >= config.action_threshold {
            Action::Buy
        } else if mapped <= -config.action_threshold {
            Action::Sell
        } else {
            Action::Hold
        };

        let total_weight = strategy.total_weight();
        let confidence = if total_weight > 0.0 {
            (net.abs() / total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let entry_price = bars[index].close;
        let exit = match action {
            Action::Hold => None,
            Action::Buy | Action::Sell => {
                Some(plan_exit(action, entry_price, indicators.atr[index], levels, config))
            }
        };

        debug!(
            strategy = strategy.name(),
            index,
            ?action,
            score = mapped,
            "signal evaluated"
        );

        Ok(Signal {
            timestamp: bars[index].timestamp,
            action,
            strength: mapped.abs(),
            confidence,
            entry_price,
            exit,
            contributing,
        })
    }
}

/// Stop distance is the tighter of ATR x multiplier and the gap to the
/// nearest protective level, floored at min_risk_pct of entry. Take-profits
/// ladder out at configured multiples of that distance.
fn plan_exit(
    action: Action,
    entry: f64,
    atr: f64,
    levels: &LevelAnalysis,
    config: &SignalConfig,
) -> ExitPlan {
    let floor = entry * config.min_risk_pct / 100.0;
    let mut distance = f64::INFINITY;
    if atr.is_finite() && atr > 0.0 {
        distance = atr * config.atr_multiplier;
    }

    let protective_kind = match action {
        Action::Buy => LevelKind::Support,
        _ => LevelKind::Resistance,
    };
    if let Some(level) = levels.nearest_level(entry, protective_kind) {
        let gap = (entry - level.price).abs();
        if gap > 0.0 {
            distance = distance.min(gap);
        }
    }
    if !distance.is_finite() {
        distance = floor;
    }
    distance = distance.max(floor);

    let sign = if action == Action::Buy { 1.0 } else { -1.0 };
    let stop_loss = entry - sign * distance;
    let take_profits = config
        .take_profit_multiples
        .iter()
        .map(|m| entry + sign * distance * m)
        .collect();

    ExitPlan {
        stop_loss,
        take_profits,
        risk_reward_ratio: config.take_profit_multiples[0],
    }
}
