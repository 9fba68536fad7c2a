//! Support/resistance level detection, pivot points, and breakout scanning.

mod breakout;
mod cluster;
mod detector;
mod pivot;
mod swing;

pub use detector::{LevelConfig, SupportResistanceDetector};
pub use pivot::{pivot_points, PivotPeriod};
