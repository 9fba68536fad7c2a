//! Error taxonomy shared by all analysis components.
//!
//! Policy: bad input fails fast with a typed error carrying the offending
//! index or field — no silent defaults. Warm-up positions inside a valid but
//! short series are marked `f64::NAN` in the output and are never errors.

/// Errors produced by the analysis core.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// A configuration parameter is out of range (non-positive period,
    /// zero tolerance, etc.). Raised by `validate()` before any computation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The bar series is too short for the requested computation.
    #[error("insufficient data: need at least {required} bars, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A structural violation in the bar series: non-monotonic timestamps,
    /// non-positive prices, NaN fields. Always fatal.
    #[error("data integrity violation at bar {index}: {reason}")]
    DataIntegrity { index: usize, reason: String },

    /// A strategy referenced a rule name the registry does not know.
    /// Raised at strategy-registration time, never mid-scoring.
    #[error("unknown rule: {0}")]
    UnknownRule(String),
}

impl AnalysisError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn integrity(index: usize, reason: impl Into<String>) -> Self {
        Self::DataIntegrity {
            index,
            reason: reason.into(),
        }
    }
}
