//! Deterministic bar-by-bar backtest replay.
//!
//! Indicators are computed once over the cleaned series (they are causal);
//! level detection is recomputed on each prefix because swing confirmation
//! and breakout windows look past the bar being scored. The replay holds at
//! most one position, sized from closed equity, and marks to market every
//! bar.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use siglab_core::domain::Action;
use siglab_core::error::AnalysisError;
use siglab_core::indicators::{IndicatorConfig, IndicatorEngine, IndicatorSet};
use siglab_core::levels::{LevelConfig, SupportResistanceDetector};
use siglab_core::signals::{SignalConfig, SignalEngine, Strategy};
use siglab_core::{Bar, LevelAnalysis};

use crate::metrics;
use crate::trade::{BacktestResult, ExitReason, Trade, TradeDirection};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Fraction of closed equity committed per entry.
    pub position_size_pct: f64,
    /// Bars a position may stay open before a forced exit.
    pub max_holding_bars: usize,
    /// Recompute level detection every this many bars (1 = every bar).
    pub level_refresh_interval: usize,
    pub periods_per_year: f64,
    pub indicator: IndicatorConfig,
    pub levels: LevelConfig,
    pub signal: SignalConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            position_size_pct: 0.95,
            max_holding_bars: 10,
            level_refresh_interval: 1,
            periods_per_year: 252.0,
            indicator: IndicatorConfig::default(),
            levels: LevelConfig::default(),
            signal: SignalConfig::default(),
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(AnalysisError::invalid_config(
                "initial_capital must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.position_size_pct) || self.position_size_pct == 0.0 {
            return Err(AnalysisError::invalid_config(
                "position_size_pct must be in (0, 1]",
            ));
        }
        if self.max_holding_bars == 0 {
            return Err(AnalysisError::invalid_config(
                "max_holding_bars must be positive",
            ));
        }
        if self.level_refresh_interval == 0 {
            return Err(AnalysisError::invalid_config(
                "level_refresh_interval must be positive",
            ));
        }
        if self.periods_per_year <= 0.0 {
            return Err(AnalysisError::invalid_config(
                "periods_per_year must be positive",
            ));
        }
        self.indicator.validate()?;
        self.levels.validate()?;
        self.signal.validate()?;
        Ok(())
    }

    /// Bars needed before the first signal can be scored.
    fn warmup(&self) -> usize {
        self.indicator
            .max_warmup()
            .max(2 * self.levels.lookback + 1)
    }
}

#[derive(Debug, Clone)]
struct Position {
    direction: TradeDirection,
    entry_index: usize,
    entry_price: f64,
    quantity: f64,
    stop: f64,
    targets: Vec<f64>,
}

impl Position {
    fn unrealized(&self, price: f64) -> f64 {
        match self.direction {
            TradeDirection::Long => (price - self.entry_price) * self.quantity,
            TradeDirection::Short => (self.entry_price - price) * self.quantity,
        }
    }
}

pub struct BacktestEngine;

impl BacktestEngine {
    pub fn run(
        bars: &[Bar],
        strategy: &Strategy,
        config: &BacktestConfig,
    ) -> Result<BacktestResult, AnalysisError> {
        config.validate()?;

        // Ordering violations are structural and fatal.
        for i in 1..bars.len() {
            if bars[i].timestamp <= bars[i - 1].timestamp {
                return Err(AnalysisError::integrity(
                    i,
                    "timestamps must be strictly increasing",
                ));
            }
        }

        // Malformed bars are recoverable: drop them and note the skip.
        let mut notes = Vec::new();
        let mut clean = Vec::with_capacity(bars.len());
        for (i, bar) in bars.iter().enumerate() {
            match malformed_reason(bar) {
                Some(reason) => notes.push(format!("skipped malformed bar {i}: {reason}")),
                None => clean.push(bar.clone()),
            }
        }

        let warmup = config.warmup();
        if clean.len() <= warmup {
            return Err(AnalysisError::InsufficientData {
                required: warmup + 1,
                actual: clean.len(),
            });
        }

        info!(
            strategy = strategy.name(),
            bars = clean.len(),
            skipped = notes.len(),
            "backtest starting"
        );

        let indicators = IndicatorEngine::compute(&clean, &config.indicator)?;
        let mut replay = Replay {
            clean: &clean,
            indicators: &indicators,
            strategy,
            config,
            realized: 0.0,
            trades: Vec::new(),
            equity_curve: Vec::with_capacity(clean.len()),
            position: None,
            levels: None,
        };

        for t in 0..clean.len() {
            if t >= warmup {
                replay.refresh_levels(t, warmup)?;
                replay.step(t)?;
            }
            replay.mark(t);
        }
        replay.force_close(clean.len() - 1);
        // The final mark already equals closed equity: the forced exit fills
        // at the same close the last mark used.
        if let Some(last) = replay.equity_curve.last_mut() {
            *last = config.initial_capital + replay.realized;
        }

        let final_equity = config.initial_capital + replay.realized;
        let result = BacktestResult {
            win_rate: metrics::win_rate(&replay.trades),
            average_return: metrics::average_return(&replay.trades),
            max_drawdown: metrics::max_drawdown(&replay.equity_curve),
            sharpe_ratio: metrics::sharpe_ratio(&replay.equity_curve, config.periods_per_year),
            profit_factor: metrics::profit_factor(&replay.trades),
            total_trades: replay.trades.len(),
            trades: replay.trades,
            equity_curve: replay.equity_curve,
            final_equity,
            notes,
        };

        info!(
            trades = result.total_trades,
            final_equity = result.final_equity,
            "backtest complete"
        );
        Ok(result)
    }
}

struct Replay<'a> {
    clean: &'a [Bar],
    indicators: &'a IndicatorSet,
    strategy: &'a Strategy,
    config: &'a BacktestConfig,
    realized: f64,
    trades: Vec<Trade>,
    equity_curve: Vec<f64>,
    position: Option<Position>,
    levels: Option<LevelAnalysis>,
}

impl Replay<'_> {
    fn refresh_levels(&mut self, t: usize, warmup: usize) -> Result<(), AnalysisError> {
        let due = (t - warmup) % self.config.level_refresh_interval == 0;
        if self.levels.is_none() || due {
            let analysis =
                SupportResistanceDetector::detect(&self.clean[..=t], &self.config.levels)?;
            self.levels = Some(analysis);
        }
        Ok(())
    }

    fn step(&mut self, t: usize) -> Result<(), AnalysisError> {
        match self.position.clone() {
            Some(pos) => self.manage_position(t, &pos),
            None => self.try_enter(t),
        }
    }

    /// Exit checks in conservative intrabar order: stop before target, then
    /// signal reversal, then the holding-period timeout.
    fn manage_position(&mut self, t: usize, pos: &Position) -> Result<(), AnalysisError> {
        let bar = &self.clean[t];

        let stop_hit = match pos.direction {
            TradeDirection::Long => bar.low <= pos.stop,
            TradeDirection::Short => bar.high >= pos.stop,
        };
        if stop_hit {
            let stop = pos.stop;
            self.close_position(t, stop, ExitReason::Stop);
            return Ok(());
        }

        let target_hit = pos.targets.iter().copied().find(|&tp| match pos.direction {
            TradeDirection::Long => bar.high >= tp,
            TradeDirection::Short => bar.low <= tp,
        });
        if let Some(target) = target_hit {
            self.close_position(t, target, ExitReason::Target);
            return Ok(());
        }

        let signal = self.evaluate(t)?;
        let reversed = matches!(
            (pos.direction, signal.action),
            (TradeDirection::Long, Action::Sell) | (TradeDirection::Short, Action::Buy)
        );
        if reversed {
            self.close_position(t, bar.close, ExitReason::SignalReversal);
            return Ok(());
        }

        if t - pos.entry_index >= self.config.max_holding_bars {
            self.close_position(t, bar.close, ExitReason::Timeout);
        }
        Ok(())
    }

    fn try_enter(&mut self, t: usize) -> Result<(), AnalysisError> {
        let signal = self.evaluate(t)?;
        let direction = match signal.action {
            Action::Buy => TradeDirection::Long,
            Action::Sell => TradeDirection::Short,
            Action::Hold => return Ok(()),
        };
        let exit = signal
            .exit
            .as_ref()
            .ok_or_else(|| AnalysisError::integrity(t, "actionable signal without exit plan"))?;

        let close = self.clean[t].close;
        let equity = self.config.initial_capital + self.realized;
        let quantity = (equity * self.config.position_size_pct / close).floor();
        if quantity < 1.0 {
            return Ok(());
        }

        debug!(index = t, ?direction, quantity, "opening position");
        self.position = Some(Position {
            direction,
            entry_index: t,
            entry_price: close,
            quantity,
            stop: exit.stop_loss,
            targets: exit.take_profits.clone(),
        });
        Ok(())
    }

    fn evaluate(&self, t: usize) -> Result<siglab_core::Signal, AnalysisError> {
        let levels = self
            .levels
            .as_ref()
            .ok_or_else(|| AnalysisError::integrity(t, "levels not refreshed before evaluation"))?;
        SignalEngine::evaluate_at(
            self.clean,
            self.indicators,
            levels,
            self.strategy,
            &self.config.signal,
            t,
        )
    }

    fn close_position(&mut self, t: usize, exit_price: f64, reason: ExitReason) {
        let Some(pos) = self.position.take() else {
            return;
        };
        let pnl = pos.unrealized(exit_price);
        let committed = pos.entry_price * pos.quantity;
        let trade = Trade {
            entry_index: pos.entry_index,
            entry_time: self.clean[pos.entry_index].timestamp,
            entry_price: pos.entry_price,
            exit_index: t,
            exit_time: self.clean[t].timestamp,
            exit_price,
            direction: pos.direction,
            quantity: pos.quantity,
            pnl,
            pnl_pct: pnl / committed * 100.0,
            exit_reason: reason,
        };
        debug!(
            entry = trade.entry_index,
            exit = trade.exit_index,
            pnl = trade.pnl,
            ?reason,
            "closed position"
        );
        self.realized += pnl;
        self.trades.push(trade);
    }

    /// A still-open position at series end closes at the final bar's close.
    fn force_close(&mut self, last: usize) {
        if self.position.is_some() {
            self.close_position(last, self.clean[last].close, ExitReason::Timeout);
        }
    }

    fn mark(&mut self, t: usize) {
        let unrealized = self
            .position
            .as_ref()
            .map(|p| p.unrealized(self.clean[t].close))
            .unwrap_or(0.0);
        self.equity_curve
            .push(self.config.initial_capital + self.realized + unrealized);
    }
}

fn malformed_reason(bar: &Bar) -> Option<&'static str> {
    let prices = [bar.open, bar.high, bar.low, bar.close];
    if prices.iter().any(|p| !p.is_finite()) || !bar.volume.is_finite() {
        return Some("non-finite field");
    }
    if prices.iter().any(|&p| p <= 0.0) {
        return Some("non-positive price");
    }
    if bar.volume < 0.0 {
        return Some("negative volume");
    }
    if bar.high < bar.low {
        return Some("high below low");
    }
    None
}
