//! Deterministic backtesting over `siglab-core` signals.
//!
//! The engine replays a bar series once, bar by bar, scoring each step with
//! the same signal pipeline callers use live and tracking at most one
//! position. Metrics are pure functions over the resulting trades and
//! equity curve; `run_batch` fans independent runs across a rayon pool.

pub mod batch;
pub mod engine;
pub mod metrics;
pub mod trade;

pub use batch::{run_batch, BacktestJob};
pub use engine::{BacktestConfig, BacktestEngine};
pub use trade::{BacktestResult, ExitReason, Trade, TradeDirection};
