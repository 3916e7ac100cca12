//! Asset health types: classification, FMEA rows, spectral presets, evaluation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Fault Classification
// ============================================================================

/// Qualitative fault state derived from a vibration reading.
///
/// Ordered by severity so `Critical > Warning > Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultClassification {
    /// At or below the ISO 10816 alarm limit
    Normal,
    /// Above the alarm limit, misalignment signature
    Warning,
    /// Severe vibration, looseness signature
    Critical,
}

impl FaultClassification {
    /// Dominant spectral peak associated with this classification.
    pub fn dominant_frequency(self) -> &'static str {
        match self {
            Self::Critical => "1x RPM (Looseness)",
            Self::Warning => "2x RPM (Misalignment)",
            Self::Normal => "None (Noise Floor)",
        }
    }

    /// Binary alarm state shared by every view.
    pub fn is_alarm(self) -> bool {
        self != Self::Normal
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Parses the status string used by telemetry payloads, case-insensitively.
impl FromStr for FaultClassification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NORMAL" => Ok(Self::Normal),
            "WARNING" => Ok(Self::Warning),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(format!(
                "unknown classification '{}' (expected NORMAL, WARNING or CRITICAL)",
                s.trim()
            )),
        }
    }
}

impl std::fmt::Display for FaultClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// FMEA
// ============================================================================

/// One row of a Failure Mode and Effects Analysis table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FmeaRow {
    /// Potential failure mode
    pub failure_mode: &'static str,
    /// Probability as a percent string ("80%")
    pub probability: &'static str,
    /// Spectral signature that points at this mode
    pub signature: &'static str,
    /// Recommended inspection
    pub inspection_action: &'static str,
}

/// Which fixed FMEA table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FmeaProfile {
    /// Severe vibration (> 0.5 in/s)
    Looseness,
    /// Everything else
    Misalignment,
}

/// Ordered FMEA table selected by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FmeaTable {
    pub profile: FmeaProfile,
    pub rows: &'static [FmeaRow],
}

// ============================================================================
// Spectral Buckets
// ============================================================================

/// Relative spectral energy at the first three running-speed harmonics.
///
/// These are preset distributions, not the output of a transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralBuckets {
    #[serde(rename = "1x RPM")]
    pub one_x: f64,
    #[serde(rename = "2x RPM")]
    pub two_x: f64,
    #[serde(rename = "3x RPM")]
    pub three_x: f64,
}

impl SpectralBuckets {
    /// Harmonic labels paired with their energy, in chart order.
    pub fn entries(&self) -> [(&'static str, f64); 3] {
        [
            ("1x RPM", self.one_x),
            ("2x RPM", self.two_x),
            ("3x RPM", self.three_x),
        ]
    }

    /// Label of the harmonic carrying the most energy.
    pub fn peak(&self) -> &'static str {
        let mut best = ("1x RPM", self.one_x);
        for entry in self.entries() {
            if entry.1 > best.1 {
                best = entry;
            }
        }
        best.0
    }
}

// ============================================================================
// Power / Emissions
// ============================================================================

/// Power draw and excess emissions at a given efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerWaste {
    /// Electrical power actually drawn (kW)
    pub actual_power_kw: f64,
    /// Power drawn above the ideal duty point (kW)
    pub excess_kw: f64,
    /// Emissions attributable to the excess draw (lbs CO2 / hr)
    pub excess_co2_lbs_per_hour: f64,
}

// ============================================================================
// Evaluation
// ============================================================================

/// Everything the views need from a single vibration reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    /// Reading this evaluation was computed from (in/s RMS)
    pub vibration: f64,
    pub classification: FaultClassification,
    pub dominant_freq: &'static str,
    /// Pump efficiency (0.40 to base efficiency)
    pub efficiency: f64,
    pub actual_power_kw: f64,
    pub excess_co2_lbs_per_hour: f64,
    pub fmea_table: FmeaTable,
    pub spectral_buckets: SpectralBuckets,
}

impl Evaluation {
    pub fn is_alarm(&self) -> bool {
        self.classification.is_alarm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_ordering() {
        assert!(FaultClassification::Critical > FaultClassification::Warning);
        assert!(FaultClassification::Warning > FaultClassification::Normal);
    }

    #[test]
    fn test_classification_wire_format() {
        let json = serde_json::to_string(&FaultClassification::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
        assert_eq!(
            " critical ".parse::<FaultClassification>(),
            Ok(FaultClassification::Critical)
        );
        let err = "degraded".parse::<FaultClassification>().unwrap_err();
        assert!(err.contains("degraded"));
    }

    #[test]
    fn test_spectral_buckets_serialize_with_harmonic_labels() {
        let buckets = SpectralBuckets { one_x: 0.2, two_x: 0.6, three_x: 0.1 };
        let v = serde_json::to_value(buckets).unwrap();
        assert_eq!(v["2x RPM"], 0.6);
        assert_eq!(buckets.peak(), "2x RPM");
    }
}
