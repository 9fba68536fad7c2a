//! Pivot point calculation.
//!
//! Standard floor-trader pivots or the Camarilla variant, computed from one
//! period's high/low/close. Period selection groups bars into calendar-date
//! sessions: Daily uses the previous completed session, Weekly the trailing
//! five completed sessions, falling back to the whole series when history is
//! too short.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, PivotMethod, PivotPointSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotPeriod {
    Daily,
    Weekly,
}

/// Pivot set from one period's high, low, close.
pub fn pivot_points(high: f64, low: f64, close: f64, method: PivotMethod) -> PivotPointSet {
    let pivot = (high + low + close) / 3.0;
    let range = high - low;
    let (resistances, supports) = match method {
        PivotMethod::Standard => (
            [
                2.0 * pivot - low,
                pivot + range,
                high + 2.0 * (pivot - low),
            ],
            [
                2.0 * pivot - high,
                pivot - range,
                low - 2.0 * (high - pivot),
            ],
        ),
        PivotMethod::Camarilla => (
            [
                close + range * 1.1 / 12.0,
                close + range * 1.1 / 6.0,
                close + range * 1.1 / 4.0,
            ],
            [
                close - range * 1.1 / 12.0,
                close - range * 1.1 / 6.0,
                close - range * 1.1 / 4.0,
            ],
        ),
    };
    PivotPointSet {
        pivot,
        resistances,
        supports,
        method,
    }
}

/// High/low/close of the pivot reference period for `bars`.
///
/// Sessions are calendar dates. The bar at the end of the series belongs to
/// the current (possibly incomplete) session, which is excluded when earlier
/// sessions exist.
pub(crate) fn period_hlc(bars: &[Bar], period: PivotPeriod) -> (f64, f64, f64) {
    debug_assert!(!bars.is_empty());
    let current = bars[bars.len() - 1].session();
    let completed: Vec<&Bar> = bars.iter().filter(|b| b.session() != current).collect();
    let reference: Vec<&Bar> = if completed.is_empty() {
        bars.iter().collect()
    } else {
        let sessions_back = match period {
            PivotPeriod::Daily => 1,
            PivotPeriod::Weekly => 5,
        };
        let mut dates: Vec<_> = completed.iter().map(|b| b.session()).collect();
        dates.dedup();
        let cutoff = dates[dates.len().saturating_sub(sessions_back)];
        completed
            .into_iter()
            .filter(|b| b.session() >= cutoff)
            .collect()
    };

    let high = reference.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let low = reference.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let close = reference.last().map(|b| b.close).unwrap_or(f64::NAN);
    (high, low, close)
}
