//! Average True Range.
//!
//! True range = max(high - low, |high - prev_close|, |low - prev_close|).
//! Wilder smoothing: seed with the mean of the first `period` true ranges,
//! then atr = (prev * (period - 1) + tr) / period. Always >= 0.
//! Lookback: period.

use crate::domain::Bar;

pub fn atr(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return result;
    }

    let tr = |i: usize| -> f64 {
        let prev_close = bars[i - 1].close;
        let hl = bars[i].high - bars[i].low;
        let hc = (bars[i].high - prev_close).abs();
        let lc = (bars[i].low - prev_close).abs();
        hl.max(hc).max(lc)
    };

    let mut value = (1..=period).map(tr).sum::<f64>() / period as f64;
    result[period] = value;
    for i in (period + 1)..n {
        value = (value * (period as f64 - 1.0) + tr(i)) / period as f64;
        result[i] = value;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, make_bars_hlcv};

    #[test]
    fn atr_non_negative() {
        let bars = make_bars(&[100.0, 103.0, 98.0, 105.0, 95.0, 108.0]);
        for v in atr(&bars, 3) {
            if !v.is_nan() {
                assert!(v >= 0.0);
            }
        }
    }

    #[test]
    fn atr_constant_range() {
        // Every bar spans exactly 2.0 with close == prev close.
        let bars = make_bars_hlcv(&[(101.0, 99.0, 100.0, 1000.0); 8]);
        let result = atr(&bars, 3);
        assert!(result[2].is_nan());
        assert_approx(result[3], 2.0, 1e-9);
        assert_approx(result[7], 2.0, 1e-9);
    }

    #[test]
    fn atr_gap_uses_prev_close() {
        // Gap up: high - prev_close dominates high - low.
        let bars = make_bars_hlcv(&[
            (101.0, 99.0, 100.0, 1000.0),
            (111.0, 109.0, 110.0, 1000.0),
        ]);
        let result = atr(&bars, 1);
        // TR = max(2, |111-100|, |109-100|) = 11
        assert_approx(result[1], 11.0, 1e-9);
    }

    #[test]
    fn atr_warmup_is_nan() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let result = atr(&bars, 3);
        assert!(result[0].is_nan());
        assert!(result[2].is_nan());
        assert!(!result[3].is_nan());
    }
}
