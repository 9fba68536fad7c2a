//! Bar — the fundamental market data unit.

use crate::error::AnalysisError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol at a single timestamp.
///
/// Bars are created by the data-collection collaborator and are immutable
/// once handed to the analysis core. Intraday series carry sub-daily
/// timestamps; the session boundary is the calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Typical price (HLC/3), the base of VWAP.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Trading session this bar belongs to (calendar date).
    pub fn session(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Returns true if any OHLCV field is NaN.
    pub fn has_nan(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Basic OHLCV sanity check: positive prices, high >= low, volume >= 0.
    pub fn is_sane(&self) -> bool {
        if self.has_nan() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.low > 0.0
            && self.volume >= 0.0
    }
}

/// Validate the structural invariants of a bar series.
///
/// Timestamps must be strictly increasing (no duplicates), every price
/// positive and finite, every volume non-negative and finite. The first
/// violation is reported with its bar index; components never reorder or
/// repair a broken series.
pub fn validate_series(bars: &[Bar]) -> Result<(), AnalysisError> {
    for (i, bar) in bars.iter().enumerate() {
        if bar.has_nan() {
            return Err(AnalysisError::integrity(i, "NaN field in bar"));
        }
        if !(bar.open.is_finite() && bar.high.is_finite() && bar.low.is_finite())
            || !bar.close.is_finite()
        {
            return Err(AnalysisError::integrity(i, "non-finite price"));
        }
        if bar.low <= 0.0 || bar.open <= 0.0 || bar.high <= 0.0 || bar.close <= 0.0 {
            return Err(AnalysisError::integrity(i, "non-positive price"));
        }
        if bar.volume < 0.0 || !bar.volume.is_finite() {
            return Err(AnalysisError::integrity(i, "negative or non-finite volume"));
        }
        if bar.high < bar.low {
            return Err(AnalysisError::integrity(i, "high below low"));
        }
        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            return Err(AnalysisError::integrity(
                i,
                "timestamps not strictly increasing",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_typical_price() {
        let bar = sample_bar();
        assert!((bar.typical_price() - (105.0 + 98.0 + 103.0) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn bar_detects_nan() {
        let mut bar = sample_bar();
        bar.close = f64::NAN;
        assert!(bar.has_nan());
        assert!(!bar.is_sane());
    }

    #[test]
    fn validate_accepts_clean_series() {
        let mut bars = vec![sample_bar(), sample_bar()];
        bars[1].timestamp += chrono::Duration::minutes(5);
        assert!(validate_series(&bars).is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_timestamps() {
        let bars = vec![sample_bar(), sample_bar()];
        let err = validate_series(&bars).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::DataIntegrity { index: 1, .. }
        ));
    }

    #[test]
    fn validate_rejects_nonpositive_price() {
        let mut bars = vec![sample_bar()];
        bars[0].low = 0.0;
        assert!(validate_series(&bars).is_err());
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar.timestamp, deser.timestamp);
        assert_eq!(bar.close, deser.close);
    }
}
