//! Stochastic oscillator %K / %D.
//!
//! %K = 100 * (close - lowest_low(k)) / (highest_high(k) - lowest_low(k)),
//! %D = SMA(%K, d). Guard: a flat window (highest == lowest) yields a
//! neutral 50, not a division failure.

use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct StochasticOutput {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn stochastic(bars: &[Bar], k_period: usize, d_period: usize) -> StochasticOutput {
    let n = bars.len();
    let mut k = vec![f64::NAN; n];
    let mut d = vec![f64::NAN; n];
    if k_period == 0 || d_period == 0 || n < k_period {
        return StochasticOutput { k, d };
    }

    for i in (k_period - 1)..n {
        let window = &bars[i + 1 - k_period..=i];
        let highest = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let lowest = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        k[i] = if highest > lowest {
            100.0 * (bars[i].close - lowest) / (highest - lowest)
        } else {
            50.0
        };
    }

    // %D: simple moving average of the defined %K values.
    let first_k = k_period - 1;
    for i in (first_k + d_period - 1)..n {
        let sum: f64 = k[i + 1 - d_period..=i].iter().sum();
        d[i] = sum / d_period as f64;
    }

    StochasticOutput { k, d }
}
