//! Built-in signal rules.
//!
//! A rule is a named predicate over one bar's context with a polarity and a
//! default weight. Predicates are plain `fn` pointers so rules stay `Copy`
//! and a registry is just a table. NaN indicator values make every numeric
//! comparison false, so warm-up bars fire nothing.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, BreakoutDirection, LevelAnalysis, LevelKind};
use crate::indicators::IndicatorSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    Bullish,
    Bearish,
    /// Adds its weight to whichever directional side currently leads.
    Confirming,
}

/// Everything a predicate may look at for one bar. All series share the bar
/// index; predicates only read positions `<= index`.
pub struct RuleContext<'a> {
    pub bars: &'a [Bar],
    pub indicators: &'a IndicatorSet,
    pub levels: &'a LevelAnalysis,
    pub index: usize,
}

impl<'a> RuleContext<'a> {
    fn bar(&self) -> &Bar {
        &self.bars[self.index]
    }

    fn close(&self) -> f64 {
        self.bar().close
    }

    /// Previous index, if any.
    fn prev(&self) -> Option<usize> {
        self.index.checked_sub(1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub polarity: Polarity,
    pub default_weight: f64,
    pub predicate: fn(&RuleContext) -> bool,
}

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const STOCH_OVERSOLD: f64 = 20.0;
const STOCH_OVERBOUGHT: f64 = 80.0;
const NEAR_LEVEL_PCT: f64 = 0.01;
const STRONG_LEVEL: f64 = 0.5;
const BREAKOUT_RECENCY: usize = 5;
const SURGE_MULTIPLE: f64 = 2.0;
const SURGE_WINDOW: usize = 20;

pub(crate) const BUILTIN_RULES: &[Rule] = &[
    Rule {
        name: "rsi_oversold_recovery",
        polarity: Polarity::Bullish,
        default_weight: 2.0,
        predicate: rsi_oversold_recovery,
    },
    Rule {
        name: "rsi_overbought_reversal",
        polarity: Polarity::Bearish,
        default_weight: 2.0,
        predicate: rsi_overbought_reversal,
    },
    Rule {
        name: "macd_bullish_cross",
        polarity: Polarity::Bullish,
        default_weight: 2.5,
        predicate: macd_bullish_cross,
    },
    Rule {
        name: "macd_bearish_cross",
        polarity: Polarity::Bearish,
        default_weight: 2.5,
        predicate: macd_bearish_cross,
    },
    Rule {
        name: "bollinger_squeeze_breakout",
        polarity: Polarity::Confirming,
        default_weight: 1.5,
        predicate: bollinger_squeeze_breakout,
    },
    Rule {
        name: "bollinger_lower_bounce",
        polarity: Polarity::Bullish,
        default_weight: 1.5,
        predicate: bollinger_lower_bounce,
    },
    Rule {
        name: "bollinger_upper_rejection",
        polarity: Polarity::Bearish,
        default_weight: 1.5,
        predicate: bollinger_upper_rejection,
    },
    Rule {
        name: "price_above_vwap",
        polarity: Polarity::Bullish,
        default_weight: 1.0,
        predicate: price_above_vwap,
    },
    Rule {
        name: "price_below_vwap",
        polarity: Polarity::Bearish,
        default_weight: 1.0,
        predicate: price_below_vwap,
    },
    Rule {
        name: "stoch_oversold",
        polarity: Polarity::Bullish,
        default_weight: 1.0,
        predicate: stoch_oversold,
    },
    Rule {
        name: "stoch_overbought",
        polarity: Polarity::Bearish,
        default_weight: 1.0,
        predicate: stoch_overbought,
    },
    Rule {
        name: "ema_bullish_cross",
        polarity: Polarity::Bullish,
        default_weight: 2.0,
        predicate: ema_bullish_cross,
    },
    Rule {
        name: "ema_bearish_cross",
        polarity: Polarity::Bearish,
        default_weight: 2.0,
        predicate: ema_bearish_cross,
    },
    Rule {
        name: "near_strong_support",
        polarity: Polarity::Bullish,
        default_weight: 1.5,
        predicate: near_strong_support,
    },
    Rule {
        name: "near_strong_resistance",
        polarity: Polarity::Bearish,
        default_weight: 1.5,
        predicate: near_strong_resistance,
    },
    Rule {
        name: "breakout_up_confirmed",
        polarity: Polarity::Bullish,
        default_weight: 2.5,
        predicate: breakout_up_confirmed,
    },
    Rule {
        name: "breakout_down_confirmed",
        polarity: Polarity::Bearish,
        default_weight: 2.5,
        predicate: breakout_down_confirmed,
    },
    Rule {
        name: "volume_surge_bullish",
        polarity: Polarity::Bullish,
        default_weight: 1.0,
        predicate: volume_surge_bullish,
    },
    Rule {
        name: "volume_surge_bearish",
        polarity: Polarity::Bearish,
        default_weight: 1.0,
        predicate: volume_surge_bearish,
    },
];

fn rsi_oversold_recovery(ctx: &RuleContext) -> bool {
    let Some(prev) = ctx.prev() else { return false };
    let rsi = &ctx.indicators.rsi;
    rsi[prev] < RSI_OVERSOLD && rsi[ctx.index] > rsi[prev]
}

fn rsi_overbought_reversal(ctx: &RuleContext) -> bool {
    let Some(prev) = ctx.prev() else { return false };
    let rsi = &ctx.indicators.rsi;
    rsi[prev] > RSI_OVERBOUGHT && rsi[ctx.index] < rsi[prev]
}

fn macd_bullish_cross(ctx: &RuleContext) -> bool {
    let Some(prev) = ctx.prev() else { return false };
    let ind = ctx.indicators;
    ind.macd_line[prev] <= ind.macd_signal[prev] && ind.macd_line[ctx.index] > ind.macd_signal[ctx.index]
}

fn macd_bearish_cross(ctx: &RuleContext) -> bool {
    let Some(prev) = ctx.prev() else { return false };
    let ind = ctx.indicators;
    ind.macd_line[prev] >= ind.macd_signal[prev] && ind.macd_line[ctx.index] < ind.macd_signal[ctx.index]
}

fn bollinger_squeeze_breakout(ctx: &RuleContext) -> bool {
    let Some(prev) = ctx.prev() else { return false };
    let ind = ctx.indicators;
    ind.bb_squeeze[prev]
        && (ctx.close() > ind.bb_upper[ctx.index] || ctx.close() < ind.bb_lower[ctx.index])
}

fn bollinger_lower_bounce(ctx: &RuleContext) -> bool {
    let lower = ctx.indicators.bb_lower[ctx.index];
    ctx.bar().low <= lower && ctx.close() > lower
}

fn bollinger_upper_rejection(ctx: &RuleContext) -> bool {
    let upper = ctx.indicators.bb_upper[ctx.index];
    ctx.bar().high >= upper && ctx.close() < upper
}

fn price_above_vwap(ctx: &RuleContext) -> bool {
    ctx.close() > ctx.indicators.vwap[ctx.index]
}

fn price_below_vwap(ctx: &RuleContext) -> bool {
    ctx.close() < ctx.indicators.vwap[ctx.index]
}

fn stoch_oversold(ctx: &RuleContext) -> bool {
    ctx.indicators.stoch_k[ctx.index] < STOCH_OVERSOLD
}

fn stoch_overbought(ctx: &RuleContext) -> bool {
    ctx.indicators.stoch_k[ctx.index] > STOCH_OVERBOUGHT
}

fn ema_bullish_cross(ctx: &RuleContext) -> bool {
    let Some(prev) = ctx.prev() else { return false };
    let ind = ctx.indicators;
    ind.ema_fast[prev] <= ind.ema_slow[prev] && ind.ema_fast[ctx.index] > ind.ema_slow[ctx.index]
}

fn ema_bearish_cross(ctx: &RuleContext) -> bool {
    let Some(prev) = ctx.prev() else { return false };
    let ind = ctx.indicators;
    ind.ema_fast[prev] >= ind.ema_slow[prev] && ind.ema_fast[ctx.index] < ind.ema_slow[ctx.index]
}

fn near_level(ctx: &RuleContext, kind: LevelKind) -> bool {
    let close = ctx.close();
    ctx.levels
        .nearest_level(close, kind)
        .map(|level| {
            level.strength >= STRONG_LEVEL && (close - level.price).abs() <= close * NEAR_LEVEL_PCT
        })
        .unwrap_or(false)
}

fn near_strong_support(ctx: &RuleContext) -> bool {
    near_level(ctx, LevelKind::Support)
}

fn near_strong_resistance(ctx: &RuleContext) -> bool {
    near_level(ctx, LevelKind::Resistance)
}

fn recent_breakout(ctx: &RuleContext, direction: BreakoutDirection) -> bool {
    ctx.levels.breakouts.iter().any(|e| {
        e.direction == direction
            && e.bar_index <= ctx.index
            && ctx.index - e.bar_index <= BREAKOUT_RECENCY
    })
}

fn breakout_up_confirmed(ctx: &RuleContext) -> bool {
    recent_breakout(ctx, BreakoutDirection::Up)
}

fn breakout_down_confirmed(ctx: &RuleContext) -> bool {
    recent_breakout(ctx, BreakoutDirection::Down)
}

fn volume_surge(ctx: &RuleContext) -> bool {
    let start = ctx.index.saturating_sub(SURGE_WINDOW);
    let window = &ctx.bars[start..ctx.index];
    if window.is_empty() {
        return false;
    }
    let avg = window.iter().map(|b| b.volume).sum::<f64>() / window.len() as f64;
    avg > 0.0 && ctx.bar().volume >= SURGE_MULTIPLE * avg
}

fn volume_surge_bullish(ctx: &RuleContext) -> bool {
    volume_surge(ctx) && ctx.close() > ctx.bar().open
}

fn volume_surge_bearish(ctx: &RuleContext) -> bool {
    volume_surge(ctx) && ctx.close() < ctx.bar().open
}
