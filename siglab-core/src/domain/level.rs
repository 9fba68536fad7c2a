//! Price levels, pivot points, and breakout events.

use serde::{Deserialize, Serialize};

/// Which side of price a level defends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelKind {
    Support,
    Resistance,
}

/// A significant horizontal price level formed by clustered swing extrema.
///
/// Within one detection run, no two same-kind levels lie within the
/// configured tolerance of each other — proximate candidates are merged
/// with combined touch counts and the maximum strength.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub kind: LevelKind,
    /// Normalized strength score in [0, 1].
    pub strength: f64,
    /// Number of bars whose high/low touched the level within tolerance.
    pub touch_count: usize,
    /// Bar index of the most recent touch.
    pub last_touch_index: usize,
    /// Total volume traded on the touching bars.
    pub total_volume: f64,
}

/// Pivot calculation variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotMethod {
    Standard,
    Camarilla,
}

/// One period's pivot point with its derived support/resistance bands.
///
/// Invariant (both methods): supports[2] < supports[1] < supports[0]
/// < pivot < resistances[0] < resistances[1] < resistances[2] whenever the
/// source period has a non-degenerate range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotPointSet {
    pub pivot: f64,
    /// R1, R2, R3 in ascending order.
    pub resistances: [f64; 3],
    /// S1, S2, S3 in descending order (S1 closest to the pivot).
    pub supports: [f64; 3],
    pub method: PivotMethod,
}

/// Direction a breakout moved through its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakoutDirection {
    Up,
    Down,
}

/// A confirmed breakout through a detected level.
///
/// Unconfirmed and failed breakouts are never surfaced: an event is created
/// internally when a close first crosses a level and only kept once the
/// confirmation rule (consecutive closes + volume) is satisfied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakoutEvent {
    pub level_price: f64,
    pub level_kind: LevelKind,
    pub direction: BreakoutDirection,
    /// Index of the bar whose close first crossed the level.
    pub bar_index: usize,
    /// Whether the breakout bar carried volume above the configured multiple
    /// of the trailing average.
    pub volume_confirmed: bool,
}

/// Complete output of one support/resistance detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelAnalysis {
    pub levels: Vec<PriceLevel>,
    pub pivots: PivotPointSet,
    pub breakouts: Vec<BreakoutEvent>,
}

impl LevelAnalysis {
    /// Nearest level of `kind` on the defending side of `price`: the highest
    /// support below it, or the lowest resistance above it. Falls back to the
    /// strongest level of that kind when none is on the defending side.
    pub fn nearest_level(&self, price: f64, kind: LevelKind) -> Option<&PriceLevel> {
        let same_kind = || self.levels.iter().filter(|l| l.kind == kind);

        let candidate = match kind {
            LevelKind::Support => same_kind()
                .filter(|l| l.price < price)
                .max_by(|a, b| a.price.total_cmp(&b.price)),
            LevelKind::Resistance => same_kind()
                .filter(|l| l.price > price)
                .min_by(|a, b| a.price.total_cmp(&b.price)),
        };

        candidate.or_else(|| same_kind().max_by(|a, b| a.strength.total_cmp(&b.strength)))
    }
}
