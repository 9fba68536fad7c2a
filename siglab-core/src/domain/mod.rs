//! Domain types shared across the analysis components.

pub mod bar;
pub mod level;
pub mod signal;

pub use bar::{validate_series, Bar};
pub use level::{
    BreakoutDirection, BreakoutEvent, LevelAnalysis, LevelKind, PivotMethod, PivotPointSet,
    PriceLevel,
};
pub use signal::{Action, ExitPlan, Signal};
