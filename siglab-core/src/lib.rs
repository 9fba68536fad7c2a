//! Core technical-analysis library: bar-series domain types, indicator
//! computation, support/resistance level detection, and weighted signal
//! generation.
//!
//! Everything here is deterministic and side-effect free: the same bars and
//! configuration always produce the same output, and nothing touches global
//! state. Backtesting lives in the companion `siglab-backtest` crate.

pub mod domain;
pub mod error;
pub mod indicators;
pub mod levels;
pub mod signals;

pub use domain::{Bar, LevelAnalysis, Signal};
pub use error::AnalysisError;
pub use indicators::{IndicatorConfig, IndicatorEngine, IndicatorSet};
pub use levels::{LevelConfig, SupportResistanceDetector};
pub use signals::{SignalConfig, SignalEngine, Strategy, StrategyConfig};
