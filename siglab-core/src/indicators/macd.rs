//! Moving Average Convergence Divergence.
//!
//! Line = EMA(fast) - EMA(slow); signal = EMA(line, signal_period);
//! histogram = line - signal. The line is defined from the slow EMA's
//! warm-up; the signal needs a further signal_period values.

use super::ema::{ema, ema_series};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct MacdOutput {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(bars: &[Bar], fast: usize, slow: usize, signal_period: usize) -> MacdOutput {
    let n = bars.len();
    let fast_ema = ema(bars, fast);
    let slow_ema = ema(bars, slow);

    let mut line = vec![f64::NAN; n];
    for i in 0..n {
        if !fast_ema[i].is_nan() && !slow_ema[i].is_nan() {
            line[i] = fast_ema[i] - slow_ema[i];
        }
    }

    let signal = ema_series(&line, signal_period);
    let mut histogram = vec![f64::NAN; n];
    for i in 0..n {
        if !line[i].is_nan() && !signal[i].is_nan() {
            histogram[i] = line[i] - signal[i];
        }
    }

    MacdOutput {
        line,
        signal,
        histogram,
    }
}
