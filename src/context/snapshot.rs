//! Immutable view of the dashboard context.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ContextError;
use crate::asset_health::Vibration;
use crate::config::defaults::DEFAULT_CARBON_WASTE_LBS_PER_HOUR;
use crate::types::TelemetryPayload;

/// Where the current vibration reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingSource {
    /// Initial or reset value
    Default,
    /// Set by an operator through the API
    Manual,
    /// Delivered by the telemetry feed
    Telemetry,
}

/// Point-in-time copy of the shared context.
///
/// Views take a snapshot in and hand an updated snapshot back; the `with_*`
/// methods never mutate in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSnapshot {
    pub current_vibration: Vibration,
    /// Excess emissions from the last twin evaluation (lbs CO2 / hr)
    pub carbon_waste: f64,
    pub source: ReadingSource,
    /// Last telemetry message accepted by the feed
    pub last_payload: Option<TelemetryPayload>,
    pub updated_at: DateTime<Utc>,
}

impl Default for ContextSnapshot {
    fn default() -> Self {
        Self {
            current_vibration: Vibration::DEFAULT,
            carbon_waste: DEFAULT_CARBON_WASTE_LBS_PER_HOUR,
            source: ReadingSource::Default,
            last_payload: None,
            updated_at: Utc::now(),
        }
    }
}

impl ContextSnapshot {
    pub fn vibration_rms(&self) -> f64 {
        self.current_vibration.rms()
    }

    pub fn with_vibration(&self, vibration: Vibration, source: ReadingSource) -> Self {
        Self {
            current_vibration: vibration,
            source,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// # Errors
    ///
    /// Rejects negative or non-finite rates.
    pub fn with_carbon_waste(&self, lbs_per_hour: f64) -> Result<Self, ContextError> {
        if !lbs_per_hour.is_finite() || lbs_per_hour < 0.0 {
            return Err(ContextError::InvalidCarbonWaste(lbs_per_hour));
        }
        Ok(Self {
            carbon_waste: lbs_per_hour,
            updated_at: Utc::now(),
            ..self.clone()
        })
    }

    /// Accept a telemetry message: the reading becomes current and the payload is kept.
    ///
    /// # Errors
    ///
    /// Rejects payloads whose `vibration_rms` is not a valid reading.
    pub fn with_telemetry(&self, payload: TelemetryPayload) -> Result<Self, ContextError> {
        let vibration = Vibration::new(payload.vibration_rms)?;
        Ok(Self {
            current_vibration: vibration,
            source: ReadingSource::Telemetry,
            last_payload: Some(payload),
            updated_at: Utc::now(),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(rms: f64) -> TelemetryPayload {
        TelemetryPayload {
            timestamp: 1_718_000_000.0,
            vibration_rms: rms,
            dominant_freq: "None (Noise Floor)".to_string(),
            status: "NORMAL".to_string(),
        }
    }

    #[test]
    fn test_defaults() {
        let snap = ContextSnapshot::default();
        assert!((snap.vibration_rms() - 0.05).abs() < f64::EPSILON);
        assert_eq!(snap.carbon_waste, 0.0);
        assert_eq!(snap.source, ReadingSource::Default);
        assert!(snap.last_payload.is_none());
    }

    #[test]
    fn test_with_vibration_leaves_original_untouched() {
        let original = ContextSnapshot::default();
        let updated = original.with_vibration(Vibration::new(0.42).unwrap(), ReadingSource::Manual);
        assert!((original.vibration_rms() - 0.05).abs() < f64::EPSILON);
        assert!((updated.vibration_rms() - 0.42).abs() < f64::EPSILON);
        assert_eq!(updated.source, ReadingSource::Manual);
    }

    #[test]
    fn test_carbon_waste_must_be_non_negative() {
        let snap = ContextSnapshot::default();
        assert!(snap.with_carbon_waste(-1.0).is_err());
        assert!(snap.with_carbon_waste(f64::NAN).is_err());
        let ok = snap.with_carbon_waste(5.74).unwrap();
        assert!((ok.carbon_waste - 5.74).abs() < f64::EPSILON);
    }

    #[test]
    fn test_with_telemetry_keeps_payload() {
        let snap = ContextSnapshot::default().with_telemetry(payload(0.61)).unwrap();
        assert_eq!(snap.source, ReadingSource::Telemetry);
        assert!((snap.vibration_rms() - 0.61).abs() < f64::EPSILON);
        assert_eq!(snap.last_payload.as_ref().map(|p| p.vibration_rms), Some(0.61));
    }

    #[test]
    fn test_with_telemetry_rejects_negative_reading() {
        assert!(ContextSnapshot::default().with_telemetry(payload(-0.2)).is_err());
    }
}
