//! Breakout detection state machine.
//!
//! Each level tracks None -> Testing -> Confirmed | Failed. Testing begins on
//! the first close beyond the level; the attempt confirms once
//! `confirm_closes` consecutive closes land beyond it and the breakout bar's
//! volume reaches `volume_multiple` times the trailing average. A re-cross
//! fails the attempt, and a completed streak on a quiet breakout bar is
//! dropped the same way; neither is surfaced. Config validation bounds
//! `confirm_closes` by the confirmation window, so a confirming streak
//! always completes inside it.

use crate::domain::{Bar, BreakoutDirection, BreakoutEvent, LevelKind, PriceLevel};

#[derive(Debug, Clone, Copy)]
pub(crate) struct BreakoutConfig {
    pub confirm_closes: usize,
    pub volume_multiple: f64,
    pub volume_avg_window: usize,
}

pub(crate) fn detect_breakouts(
    bars: &[Bar],
    levels: &[PriceLevel],
    config: &BreakoutConfig,
) -> Vec<BreakoutEvent> {
    let mut events = Vec::new();
    for level in levels {
        scan_level(bars, level, config, &mut events);
    }
    events.sort_by_key(|e| e.bar_index);
    events
}

fn scan_level(
    bars: &[Bar],
    level: &PriceLevel,
    config: &BreakoutConfig,
    events: &mut Vec<BreakoutEvent>,
) {
    // Resistance breaks up, support breaks down.
    let direction = match level.kind {
        LevelKind::Resistance => BreakoutDirection::Up,
        LevelKind::Support => BreakoutDirection::Down,
    };
    let beyond = |close: f64| match direction {
        BreakoutDirection::Up => close > level.price,
        BreakoutDirection::Down => close < level.price,
    };

    let mut attempt_start: Option<usize> = None;
    let mut streak = 0usize;

    for (t, bar) in bars.iter().enumerate() {
        if !beyond(bar.close) {
            attempt_start = None;
            streak = 0;
            continue;
        }
        let start = *attempt_start.get_or_insert(t);
        streak += 1;
        if streak >= config.confirm_closes {
            // A quiet breakout bar disqualifies the attempt; the next bar
            // beyond the level starts a fresh one.
            if volume_confirmed(bars, start, config) {
                events.push(BreakoutEvent {
                    level_price: level.price,
                    level_kind: level.kind,
                    direction,
                    bar_index: start,
                    volume_confirmed: true,
                });
            }
            attempt_start = None;
            streak = 0;
        }
    }
}

fn volume_confirmed(bars: &[Bar], index: usize, config: &BreakoutConfig) -> bool {
    let start = index.saturating_sub(config.volume_avg_window);
    let window = &bars[start..index];
    if window.is_empty() {
        return false;
    }
    let avg = window.iter().map(|b| b.volume).sum::<f64>() / window.len() as f64;
    bars[index].volume >= config.volume_multiple * avg
}
