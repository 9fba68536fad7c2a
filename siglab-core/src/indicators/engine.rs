//! Indicator engine — computes the full aligned indicator set for a series.
//!
//! The engine is a pure transform: bars + config in, one freshly allocated
//! `IndicatorSet` out. No caching, no shared state; callers that want reuse
//! own the result.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::atr::atr;
use super::bollinger::bollinger;
use super::ema::ema;
use super::macd::macd;
use super::rsi::rsi;
use super::sma::sma;
use super::stochastic::stochastic;
use super::vwap::vwap;
use crate::domain::{validate_series, Bar};
use crate::error::AnalysisError;

/// Periods and multipliers for every computed indicator.
///
/// Defaults follow the common day-trading set: RSI 14, MACD 12/26/9,
/// Bollinger 20/2.0, ATR 14, stochastic 14/3, EMA 9/21, SMA 25/75.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub bb_squeeze_window: usize,
    pub bb_squeeze_quantile: f64,
    pub atr_period: usize,
    pub stoch_k_period: usize,
    pub stoch_d_period: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub sma_short: usize,
    pub sma_long: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bb_period: 20,
            bb_std_dev: 2.0,
            bb_squeeze_window: 20,
            bb_squeeze_quantile: 0.10,
            atr_period: 14,
            stoch_k_period: 14,
            stoch_d_period: 3,
            ema_fast: 9,
            ema_slow: 21,
            sma_short: 25,
            sma_long: 75,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bb_period", self.bb_period),
            ("bb_squeeze_window", self.bb_squeeze_window),
            ("atr_period", self.atr_period),
            ("stoch_k_period", self.stoch_k_period),
            ("stoch_d_period", self.stoch_d_period),
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("sma_short", self.sma_short),
            ("sma_long", self.sma_long),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(AnalysisError::invalid_config(format!(
                    "{name} must be positive"
                )));
            }
        }
        if self.bb_std_dev <= 0.0 {
            return Err(AnalysisError::invalid_config("bb_std_dev must be positive"));
        }
        if !(0.0..=1.0).contains(&self.bb_squeeze_quantile) {
            return Err(AnalysisError::invalid_config(
                "bb_squeeze_quantile must be in [0, 1]",
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(AnalysisError::invalid_config(
                "macd_fast must be shorter than macd_slow",
            ));
        }
        Ok(())
    }

    /// Bars needed before the slowest indicator produces a defined value.
    pub fn max_warmup(&self) -> usize {
        [
            self.sma_long,
            self.sma_short,
            self.ema_slow,
            self.rsi_period + 1,
            self.macd_slow + self.macd_signal - 1,
            self.bb_period,
            self.atr_period + 1,
            self.stoch_k_period + self.stoch_d_period - 1,
        ]
        .into_iter()
        .max()
        .unwrap_or(1)
    }
}

/// One aligned numeric series per indicator, same length and index alignment
/// as the input bars. Warm-up positions hold `f64::NAN`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub sma_short: Vec<f64>,
    pub sma_long: Vec<f64>,
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub rsi: Vec<f64>,
    pub macd_line: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_histogram: Vec<f64>,
    pub bb_upper: Vec<f64>,
    pub bb_middle: Vec<f64>,
    pub bb_lower: Vec<f64>,
    pub bb_percent_b: Vec<f64>,
    pub bb_bandwidth: Vec<f64>,
    pub bb_squeeze: Vec<bool>,
    pub atr: Vec<f64>,
    pub vwap: Vec<f64>,
    pub stoch_k: Vec<f64>,
    pub stoch_d: Vec<f64>,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }
}

pub struct IndicatorEngine;

impl IndicatorEngine {
    /// Compute the full indicator set for a bar series.
    ///
    /// Fails with `InsufficientData` only when the series cannot support any
    /// indicator at all (it is empty); positions inside an indicator's
    /// warm-up window are NaN, not errors. Every computation is causal: the
    /// value at index t depends only on bars 0..=t.
    pub fn compute(bars: &[Bar], config: &IndicatorConfig) -> Result<IndicatorSet, AnalysisError> {
        config.validate()?;
        if bars.is_empty() {
            return Err(AnalysisError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        validate_series(bars)?;

        debug!(bars = bars.len(), "computing indicator set");

        let macd_out = macd(bars, config.macd_fast, config.macd_slow, config.macd_signal);
        let bb = bollinger(
            bars,
            config.bb_period,
            config.bb_std_dev,
            config.bb_squeeze_window,
            config.bb_squeeze_quantile,
        );
        let stoch = stochastic(bars, config.stoch_k_period, config.stoch_d_period);

        Ok(IndicatorSet {
            sma_short: sma(bars, config.sma_short),
            sma_long: sma(bars, config.sma_long),
            ema_fast: ema(bars, config.ema_fast),
            ema_slow: ema(bars, config.ema_slow),
            rsi: rsi(bars, config.rsi_period),
            macd_line: macd_out.line,
            macd_signal: macd_out.signal,
            macd_histogram: macd_out.histogram,
            bb_upper: bb.upper,
            bb_middle: bb.middle,
            bb_lower: bb.lower,
            bb_percent_b: bb.percent_b,
            bb_bandwidth: bb.bandwidth,
            bb_squeeze: bb.squeeze,
            atr: atr(bars, config.atr_period),
            vwap: vwap(bars),
            stoch_k: stoch.k,
            stoch_d: stoch.d,
        })
    }
}
