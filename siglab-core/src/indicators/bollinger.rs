//! Bollinger Bands with %B, bandwidth, and squeeze detection.
//!
//! Middle = SMA(close, period); upper/lower = middle ± mult * population
//! stddev over the same window. Bandwidth = (upper - lower) / middle.
//! Squeeze: bandwidth at or below the configured quantile of its own
//! trailing window (a degenerate zero-width band therefore squeezes).

use super::sma::sma;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct BollingerOutput {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
    /// Position of the close inside the band: (close - lower) / width.
    /// 0.5 when the band has zero width.
    pub percent_b: Vec<f64>,
    pub bandwidth: Vec<f64>,
    pub squeeze: Vec<bool>,
}

pub fn bollinger(
    bars: &[Bar],
    period: usize,
    multiplier: f64,
    squeeze_window: usize,
    squeeze_quantile: f64,
) -> BollingerOutput {
    let n = bars.len();
    let middle = sma(bars, period);
    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];
    let mut percent_b = vec![f64::NAN; n];
    let mut bandwidth = vec![f64::NAN; n];
    let mut squeeze = vec![false; n];

    if n < period || period == 0 {
        return BollingerOutput {
            upper,
            middle,
            lower,
            percent_b,
            bandwidth,
            squeeze,
        };
    }

    for i in (period - 1)..n {
        let window = &bars[i + 1 - period..=i];
        let mean = middle[i];
        let variance = window
            .iter()
            .map(|b| {
                let d = b.close - mean;
                d * d
            })
            .sum::<f64>()
            / period as f64;
        let stddev = variance.sqrt();

        upper[i] = mean + multiplier * stddev;
        lower[i] = mean - multiplier * stddev;

        let width = upper[i] - lower[i];
        percent_b[i] = if width > 0.0 {
            (bars[i].close - lower[i]) / width
        } else {
            0.5
        };
        bandwidth[i] = if mean != 0.0 { width / mean } else { f64::NAN };
    }

    // Squeeze: compare bandwidth against the quantile of its trailing window.
    for i in 0..n {
        if bandwidth[i].is_nan() {
            continue;
        }
        let start = (i + 1).saturating_sub(squeeze_window);
        let window: Vec<f64> = bandwidth[start..=i]
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .collect();
        if window.len() < squeeze_window {
            continue;
        }
        let threshold = quantile(&window, squeeze_quantile);
        squeeze[i] = bandwidth[i] <= threshold;
    }

    BollingerOutput {
        upper,
        middle,
        lower,
        percent_b,
        bandwidth,
        squeeze,
    }
}

/// Linearly interpolated quantile of an unsorted sample.
fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn bollinger_band_ordering() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64).sin() * 3.0).collect();
        let bars = make_bars(&closes);
        let out = bollinger(&bars, 5, 2.0, 5, 0.1);
        for i in 4..30 {
            assert!(out.upper[i] >= out.middle[i]);
            assert!(out.middle[i] >= out.lower[i]);
        }
    }

    #[test]
    fn bollinger_flat_series_collapses_and_squeezes() {
        let bars = make_bars(&[100.0; 30]);
        let out = bollinger(&bars, 20, 2.0, 5, 0.1);
        let i = 29;
        assert_approx(out.upper[i], 100.0, DEFAULT_EPSILON);
        assert_approx(out.middle[i], 100.0, DEFAULT_EPSILON);
        assert_approx(out.lower[i], 100.0, DEFAULT_EPSILON);
        assert_approx(out.percent_b[i], 0.5, DEFAULT_EPSILON);
        assert!(out.squeeze[i], "zero-width band must flag a squeeze");
    }

    #[test]
    fn bollinger_squeeze_after_volatility_drop() {
        // 20 choppy bars followed by 20 nearly flat bars: the flat tail
        // bandwidth sits at the bottom decile of its trailing window.
        let mut closes: Vec<f64> = (0..20)
            .map(|i| 100.0 + if i % 2 == 0 { 4.0 } else { -4.0 })
            .collect();
        closes.extend(std::iter::repeat(100.0).take(20));
        let bars = make_bars(&closes);
        let out = bollinger(&bars, 5, 2.0, 10, 0.1);
        assert!(out.squeeze[39]);
        // Mid-chop bandwidth is wide, no squeeze.
        assert!(!out.squeeze[15]);
    }

    #[test]
    fn bollinger_warmup_is_nan() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0]);
        let out = bollinger(&bars, 3, 2.0, 3, 0.1);
        assert!(out.upper[1].is_nan());
        assert!(!out.upper[2].is_nan());
    }

    #[test]
    fn quantile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_approx(quantile(&values, 0.0), 1.0, DEFAULT_EPSILON);
        assert_approx(quantile(&values, 1.0), 4.0, DEFAULT_EPSILON);
        assert_approx(quantile(&values, 0.5), 2.5, DEFAULT_EPSILON);
    }
}
