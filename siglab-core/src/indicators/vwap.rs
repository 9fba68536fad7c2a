//! Volume-weighted average price, reset at each session boundary.
//!
//! VWAP = cumulative(typical price * volume) / cumulative(volume), where the
//! cumulative sums restart whenever the bar's calendar date changes. With no
//! volume accumulated yet in a session, the bar's typical price stands in.

use crate::domain::Bar;

pub fn vwap(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    let mut cum_pv = 0.0;
    let mut cum_vol = 0.0;
    let mut session = None;

    for (i, bar) in bars.iter().enumerate() {
        let date = bar.session();
        if session != Some(date) {
            session = Some(date);
            cum_pv = 0.0;
            cum_vol = 0.0;
        }
        cum_pv += bar.typical_price() * bar.volume;
        cum_vol += bar.volume;
        result[i] = if cum_vol > 0.0 {
            cum_pv / cum_vol
        } else {
            bar.typical_price()
        };
    }
    result
}
