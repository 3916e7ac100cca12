//! Asset health module - vibration classification and energy impact
//!
//! Converts a single vibration reading into the fault classification,
//! efficiency, power and emissions figures the dashboard views display.
//! Everything here is pure and reentrant.

mod model;
mod reference;

pub use model::AssetHealthModel;
pub use reference::{fmea_table, spectral_buckets};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::defaults::DEFAULT_VIBRATION_RMS;
use crate::types::FaultClassification;

/// ISO 10816 alarm limit (in/s RMS). Readings above it are WARNING or worse.
pub const ALARM_THRESHOLD_RMS: f64 = 0.3;

/// Readings above this are CRITICAL (in/s RMS).
pub const CRITICAL_THRESHOLD_RMS: f64 = 0.5;

/// Vibration at which efficiency starts to degrade (in/s RMS).
pub const DEGRADATION_ONSET_RMS: f64 = 0.15;

/// Efficiency lost per in/s RMS above the onset.
pub const DEGRADATION_SLOPE: f64 = 0.4;

/// Efficiency never drops below this, which keeps power estimates finite.
pub const EFFICIENCY_FLOOR: f64 = 0.40;

/// Errors in asset health evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HealthError {
    #[error("Invalid {field}: {value} ({reason})")]
    InvalidInput {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// A validated vibration reading in in/s RMS.
///
/// Construction rejects negative and non-finite values, so every model
/// function that takes a `Vibration` is total.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Vibration(f64);

impl Vibration {
    /// Reading a fresh context starts from.
    pub const DEFAULT: Self = Self(DEFAULT_VIBRATION_RMS);

    pub fn new(rms: f64) -> Result<Self, HealthError> {
        if !rms.is_finite() {
            return Err(HealthError::InvalidInput {
                field: "vibration",
                value: rms,
                reason: "must be a finite number",
            });
        }
        if rms < 0.0 {
            return Err(HealthError::InvalidInput {
                field: "vibration",
                value: rms,
                reason: "must be >= 0",
            });
        }
        Ok(Self(rms))
    }

    pub fn rms(self) -> f64 {
        self.0
    }

    /// Above the ISO 10816 alarm limit.
    pub fn is_alarm(self) -> bool {
        classify(self).is_alarm()
    }
}

impl TryFrom<f64> for Vibration {
    type Error = HealthError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Vibration> for f64 {
    fn from(v: Vibration) -> Self {
        v.0
    }
}

impl std::fmt::Display for Vibration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classify a reading against the fixed (0.3, 0.5) thresholds.
///
/// Comparisons are strict: exactly 0.3 is NORMAL and exactly 0.5 is WARNING.
pub fn classify(vibration: Vibration) -> FaultClassification {
    let v = vibration.rms();
    if v > CRITICAL_THRESHOLD_RMS {
        FaultClassification::Critical
    } else if v > ALARM_THRESHOLD_RMS {
        FaultClassification::Warning
    } else {
        FaultClassification::Normal
    }
}
