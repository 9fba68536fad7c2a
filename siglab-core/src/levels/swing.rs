//! Swing high/low detection.
//!
//! Index i is a swing high iff its high strictly exceeds every high within
//! `lookback` bars on each side; symmetric for lows. The first and last
//! `lookback` bars can never qualify because one flank is incomplete.

use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Swing {
    pub index: usize,
    pub price: f64,
}

pub(crate) fn swing_highs(bars: &[Bar], lookback: usize) -> Vec<Swing> {
    find_swings(bars, lookback, |b| b.high, |center, other| center > other)
}

pub(crate) fn swing_lows(bars: &[Bar], lookback: usize) -> Vec<Swing> {
    find_swings(bars, lookback, |b| b.low, |center, other| center < other)
}

fn find_swings(
    bars: &[Bar],
    lookback: usize,
    price: impl Fn(&Bar) -> f64,
    beats: impl Fn(f64, f64) -> bool,
) -> Vec<Swing> {
    let n = bars.len();
    if lookback == 0 || n < 2 * lookback + 1 {
        return Vec::new();
    }
    let mut swings = Vec::new();
    for i in lookback..(n - lookback) {
        let center = price(&bars[i]);
        let is_swing = (i - lookback..=i + lookback)
            .filter(|&j| j != i)
            .all(|j| beats(center, price(&bars[j])));
        if is_swing {
            swings.push(Swing {
                index: i,
                price: center,
            });
        }
    }
    swings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars_hlcv;

    fn flat(price: f64) -> (f64, f64, f64, f64) {
        (price + 0.5, price - 0.5, price, 1000.0)
    }

    #[test]
    fn isolated_peak_is_a_swing_high() {
        let bars = make_bars_hlcv(&[
            flat(100.0),
            flat(101.0),
            flat(105.0),
            flat(101.0),
            flat(100.0),
        ]);
        let highs = swing_highs(&bars, 2);
        assert_eq!(highs.len(), 1);
        assert_eq!(highs[0].index, 2);
        assert_eq!(highs[0].price, 105.5);
    }

    #[test]
    fn equal_neighbors_disqualify() {
        // Plateau: strict comparison rejects both plateau bars.
        let bars = make_bars_hlcv(&[
            flat(100.0),
            flat(105.0),
            flat(105.0),
            flat(100.0),
            flat(99.0),
        ]);
        assert!(swing_highs(&bars, 1).is_empty());
    }

    #[test]
    fn valley_is_a_swing_low() {
        let bars = make_bars_hlcv(&[
            flat(100.0),
            flat(96.0),
            flat(100.0),
        ]);
        let lows = swing_lows(&bars, 1);
        assert_eq!(lows.len(), 1);
        assert_eq!(lows[0].index, 1);
    }

    #[test]
    fn series_shorter_than_window_yields_nothing() {
        let bars = make_bars_hlcv(&[flat(100.0), flat(101.0)]);
        assert!(swing_highs(&bars, 5).is_empty());
        assert!(swing_lows(&bars, 5).is_empty());
    }
}
