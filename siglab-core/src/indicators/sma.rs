//! Simple moving average over closes.
//!
//! Lookback: period - 1. Warm-up positions are NaN.

use crate::domain::Bar;

pub fn sma(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if n < period || period == 0 {
        return result;
    }

    let mut sum: f64 = bars[..period].iter().map(|b| b.close).sum();
    result[period - 1] = sum / period as f64;
    for i in period..n {
        sum += bars[i].close - bars[i - period].close;
        result[i] = sum / period as f64;
    }
    result
}
