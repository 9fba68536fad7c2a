//! Technical indicators over OHLCV bar series.
//!
//! Every indicator is a pure function from `&[Bar]` to one or more series of
//! the same length, aligned by index with the input. Positions inside an
//! indicator's warm-up window hold `f64::NAN`; callers treat NaN as "not yet
//! defined" rather than an error. All computations are causal.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod engine;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod vwap;

pub use atr::atr;
pub use bollinger::{bollinger, BollingerOutput};
pub use ema::ema;
pub use engine::{IndicatorConfig, IndicatorEngine, IndicatorSet};
pub use macd::{macd, MacdOutput};
pub use rsi::rsi;
pub use sma::sma;
pub use stochastic::{stochastic, StochasticOutput};
pub use vwap::vwap;

#[cfg(test)]
pub(crate) const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
pub(crate) fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() <= epsilon,
        "expected {expected}, got {actual} (epsilon {epsilon})"
    );
}

/// Daily bars from a list of closes. Each bar opens at the previous close and
/// spans one point above/below the open-close range, volume fixed at 1000.
#[cfg(test)]
pub(crate) fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use chrono::{Duration, NaiveDate};

    let start = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(15, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            crate::domain::Bar {
                timestamp: start + Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Daily bars with explicit (high, low, close, volume); open is the previous
/// close.
#[cfg(test)]
pub(crate) fn make_bars_hlcv(specs: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Bar> {
    use chrono::{Duration, NaiveDate};

    let start = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(15, 0, 0)
        .unwrap();
    specs
        .iter()
        .enumerate()
        .map(|(i, &(high, low, close, volume))| {
            let open = if i == 0 { close } else { specs[i - 1].2 };
            crate::domain::Bar {
                timestamp: start + Duration::days(i as i64),
                open,
                high: high.max(open),
                low: low.min(open),
                close,
                volume,
            }
        })
        .collect()
}
