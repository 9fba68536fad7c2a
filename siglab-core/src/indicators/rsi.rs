//! Relative Strength Index (RSI).
//!
//! Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Guard: avg_loss == 0 → RSI = 100 (never NaN or infinity).
//! Lookback: period.

use crate::domain::Bar;

pub fn rsi(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return result;
    }

    // Seed: simple average of gains/losses over the first `period` changes.
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = bars[i].close - bars[i - 1].close;
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    result[period] = rsi_value(avg_gain, avg_loss);

    // Wilder smoothing for subsequent values.
    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        let change = bars[i].close - bars[i - 1].close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;
        result[i] = rsi_value(avg_gain, avg_loss);
    }
    result
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
