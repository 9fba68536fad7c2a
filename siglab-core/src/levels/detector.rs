//! Support/resistance detection facade.
//!
//! Pipeline: swing detection, per-kind clustering, touch counting over the
//! whole series, strength scoring, filtering, pivots, breakout scan. Fully
//! deterministic: identical bars and config produce identical output.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::breakout::{detect_breakouts, BreakoutConfig};
use super::cluster::{cluster_swings, Cluster};
use super::pivot::{period_hlc, pivot_points, PivotPeriod};
use super::swing::{swing_highs, swing_lows};
use crate::domain::{validate_series, Bar, LevelAnalysis, LevelKind, PivotMethod, PriceLevel};
use crate::error::AnalysisError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Bars on each side a swing must dominate.
    pub lookback: usize,
    /// Clustering / touch tolerance in percent of price (0.5 = 0.5%).
    pub tolerance_pct: f64,
    pub min_touches: usize,
    pub min_strength: f64,
    pub max_levels: usize,
    pub pivot_period: PivotPeriod,
    pub pivot_method: PivotMethod,
    pub confirmation_window: usize,
    pub confirm_closes: usize,
    pub volume_multiple: f64,
    pub volume_avg_window: usize,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            lookback: 5,
            tolerance_pct: 0.5,
            min_touches: 2,
            min_strength: 0.3,
            max_levels: 10,
            pivot_period: PivotPeriod::Daily,
            pivot_method: PivotMethod::Standard,
            confirmation_window: 3,
            confirm_closes: 2,
            volume_multiple: 1.5,
            volume_avg_window: 20,
        }
    }
}

impl LevelConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.lookback == 0 {
            return Err(AnalysisError::invalid_config("lookback must be positive"));
        }
        if self.tolerance_pct <= 0.0 {
            return Err(AnalysisError::invalid_config(
                "tolerance_pct must be positive",
            ));
        }
        if self.min_touches == 0 {
            return Err(AnalysisError::invalid_config("min_touches must be positive"));
        }
        if self.max_levels == 0 {
            return Err(AnalysisError::invalid_config("max_levels must be positive"));
        }
        if self.confirmation_window == 0 || self.confirm_closes == 0 {
            return Err(AnalysisError::invalid_config(
                "breakout confirmation settings must be positive",
            ));
        }
        if self.confirm_closes > self.confirmation_window {
            return Err(AnalysisError::invalid_config(
                "confirm_closes cannot exceed confirmation_window",
            ));
        }
        if self.volume_multiple <= 0.0 || self.volume_avg_window == 0 {
            return Err(AnalysisError::invalid_config(
                "volume confirmation settings must be positive",
            ));
        }
        Ok(())
    }

    fn tolerance_frac(&self) -> f64 {
        self.tolerance_pct / 100.0
    }
}

pub struct SupportResistanceDetector;

impl SupportResistanceDetector {
    pub fn detect(bars: &[Bar], config: &LevelConfig) -> Result<LevelAnalysis, AnalysisError> {
        config.validate()?;
        let required = 2 * config.lookback + 1;
        if bars.len() < required {
            return Err(AnalysisError::InsufficientData {
                required,
                actual: bars.len(),
            });
        }
        validate_series(bars)?;

        let tolerance = config.tolerance_frac();
        let mut levels = Vec::new();
        for cluster in cluster_swings(&swing_lows(bars, config.lookback), tolerance) {
            levels.push(build_level(bars, &cluster, LevelKind::Support, tolerance));
        }
        for cluster in cluster_swings(&swing_highs(bars, config.lookback), tolerance) {
            levels.push(build_level(bars, &cluster, LevelKind::Resistance, tolerance));
        }

        levels.retain(|l| l.touch_count >= config.min_touches && l.strength >= config.min_strength);
        levels.sort_by(|a, b| b.strength.total_cmp(&a.strength));
        levels.truncate(config.max_levels);

        let (h, l, c) = period_hlc(bars, config.pivot_period);
        let pivots = pivot_points(h, l, c, config.pivot_method);

        let breakouts = detect_breakouts(
            bars,
            &levels,
            &BreakoutConfig {
                confirm_closes: config.confirm_closes,
                volume_multiple: config.volume_multiple,
                volume_avg_window: config.volume_avg_window,
            },
        );

        debug!(
            levels = levels.len(),
            breakouts = breakouts.len(),
            "level detection complete"
        );

        Ok(LevelAnalysis {
            levels,
            pivots,
            breakouts,
        })
    }
}

/// Score a clustered level by counting touches over the full series.
///
/// A bar touches a support when its low lands within tolerance of the level
/// price; resistance uses the high. Strength blends touch count (saturating
/// at 10), touch recency, relative touch volume, and post-touch bounce size.
fn build_level(bars: &[Bar], cluster: &Cluster, kind: LevelKind, tolerance: f64) -> PriceLevel {
    let price = cluster.price;
    let band = price * tolerance;
    let probe = |bar: &Bar| match kind {
        LevelKind::Support => bar.low,
        LevelKind::Resistance => bar.high,
    };

    let mut touch_count = 0usize;
    let mut last_touch_index = 0usize;
    let mut total_volume = 0.0;
    let mut recency_sum = 0.0;
    let mut bounce_sum = 0.0;
    let n = bars.len();

    for (i, bar) in bars.iter().enumerate() {
        if (probe(bar) - price).abs() > band {
            continue;
        }
        touch_count += 1;
        last_touch_index = i;
        total_volume += bar.volume;
        recency_sum += (i + 1) as f64 / n as f64;

        // Bounce: how far price moved away from the level a few bars later.
        let after = (i + 3).min(n - 1);
        bounce_sum += (bars[after].close - price).abs() / price;
    }

    let strength = if touch_count == 0 {
        0.0
    } else {
        let touches = touch_count as f64;
        let touch_score = (touches / 10.0).min(1.0);
        let recency_score = recency_sum / touches;
        let series_avg_volume = bars.iter().map(|b| b.volume).sum::<f64>() / n as f64;
        let volume_score = if series_avg_volume > 0.0 {
            (total_volume / touches / series_avg_volume).min(1.0)
        } else {
            0.0
        };
        // A 2% average bounce saturates the bounce component.
        let bounce_score = (bounce_sum / touches / 0.02).min(1.0);
        (0.4 * touch_score + 0.2 * recency_score + 0.2 * volume_score + 0.2 * bounce_score)
            .clamp(0.0, 1.0)
    };

    PriceLevel {
        price,
        kind,
        strength,
        touch_count,
        last_touch_index,
        total_volume,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars_hlcv;

    fn bar(high: f64, low: f64, close: f64) -> (f64, f64, f64, f64) {
        (high, low, close, 1000.0)
    }

    /// Series with repeated bounces off ~100 and a ceiling near 110.
    fn bouncy_series() -> Vec<Bar> {
        let mut specs = Vec::new();
        for _ in 0..4 {
            specs.push(bar(103.0, 101.0, 102.0));
            specs.push(bar(102.0, 100.0, 101.0));
            specs.push(bar(101.0, 99.9, 100.5)); // low near 100
            specs.push(bar(104.0, 101.0, 103.5));
            specs.push(bar(108.0, 103.0, 107.0));
            specs.push(bar(110.1, 106.0, 108.0)); // high near 110
            specs.push(bar(108.0, 104.0, 105.0));
            specs.push(bar(105.0, 101.5, 102.0));
        }
        make_bars_hlcv(&specs)
    }

    #[test]
    fn detect_finds_support_and_resistance() {
        let bars = bouncy_series();
        let config = LevelConfig {
            lookback: 2,
            ..Default::default()
        };
        let analysis = SupportResistanceDetector::detect(&bars, &config).unwrap();
        assert!(!analysis.levels.is_empty());
        assert!(analysis
            .levels
            .iter()
            .any(|l| l.kind == LevelKind::Support && (l.price - 100.0).abs() < 1.0));
        assert!(analysis
            .levels
            .iter()
            .any(|l| l.kind == LevelKind::Resistance && (l.price - 110.0).abs() < 1.0));
    }

    #[test]
    fn detect_is_deterministic() {
        let bars = bouncy_series();
        let config = LevelConfig::default();
        let a = SupportResistanceDetector::detect(&bars, &config).unwrap();
        let b = SupportResistanceDetector::detect(&bars, &config).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn detect_short_series_is_insufficient() {
        let bars = make_bars_hlcv(&[bar(101.0, 99.0, 100.0); 5]);
        let config = LevelConfig::default(); // lookback 5 needs 11 bars
        let err = SupportResistanceDetector::detect(&bars, &config).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData {
                required: 11,
                actual: 5
            }
        ));
    }

    #[test]
    fn detect_rejects_zero_lookback() {
        let bars = bouncy_series();
        let config = LevelConfig {
            lookback: 0,
            ..Default::default()
        };
        assert!(matches!(
            SupportResistanceDetector::detect(&bars, &config),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn max_levels_caps_output() {
        let bars = bouncy_series();
        let config = LevelConfig {
            lookback: 1,
            max_levels: 2,
            min_touches: 1,
            min_strength: 0.0,
            ..Default::default()
        };
        let analysis = SupportResistanceDetector::detect(&bars, &config).unwrap();
        assert!(analysis.levels.len() <= 2);
    }
}
