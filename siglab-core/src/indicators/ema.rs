//! Exponential moving average.
//!
//! Seeded with the SMA of the first `period` values, then recursive with
//! alpha = 2 / (period + 1). Lookback: period - 1.

use crate::domain::Bar;

pub fn ema(bars: &[Bar], period: usize) -> Vec<f64> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    ema_series(&closes, period)
}

/// EMA over an arbitrary value series that may carry a NaN warm-up prefix
/// (e.g. a MACD line). The seed window starts at the first defined value.
pub(crate) fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }

    let first = match values.iter().position(|v| !v.is_nan()) {
        Some(i) => i,
        None => return result,
    };
    if n - first < period {
        return result;
    }

    let seed_end = first + period;
    let seed: f64 = values[first..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = seed;

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = seed;
    for i in seed_end..n {
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }
    result
}
