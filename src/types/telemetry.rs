//! Telemetry wire types published by the pump gateway.

use serde::{Deserialize, Serialize};

use super::FaultClassification;

/// Topic the P-101 gateway publishes on.
pub const PUMP_TELEMETRY_TOPIC: &str = "jci/demo/pump_p101/telemetry";

/// One telemetry sample as published by the gateway.
///
/// ```json
/// {"timestamp": 1718000000.25, "vibration_rms": 0.412,
///  "dominant_freq": "2x RPM (Misalignment)", "status": "WARNING"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPayload {
    /// Unix timestamp in seconds (fractional)
    pub timestamp: f64,
    /// Vibration amplitude, in/s RMS
    pub vibration_rms: f64,
    /// Dominant frequency label as classified by the publisher
    pub dominant_freq: String,
    /// Publisher-side status string (NORMAL / WARNING / CRITICAL)
    pub status: String,
}

impl TelemetryPayload {
    /// Publisher-side classification, if the status string is recognised.
    pub fn reported_classification(&self) -> Option<FaultClassification> {
        self.status.parse().ok()
    }
}

/// Pub/sub framing: one JSON object per line carrying the topic and payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEnvelope {
    pub topic: String,
    pub payload: TelemetryPayload,
}

impl TelemetryEnvelope {
    pub fn new(topic: impl Into<String>, payload: TelemetryPayload) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_parses_gateway_json() {
        let raw = r#"{"timestamp": 1718000000.25, "vibration_rms": 0.412,
                      "dominant_freq": "2x RPM (Misalignment)", "status": "WARNING"}"#;
        let payload: TelemetryPayload = serde_json::from_str(raw).unwrap();
        assert!((payload.vibration_rms - 0.412).abs() < f64::EPSILON);
        assert_eq!(
            payload.reported_classification(),
            Some(FaultClassification::Warning)
        );
    }

    #[test]
    fn test_unrecognised_status_has_no_classification() {
        let payload = TelemetryPayload {
            timestamp: 1.0,
            vibration_rms: 0.1,
            dominant_freq: "None (Noise Floor)".to_string(),
            status: "DEGRADED".to_string(),
        };
        assert_eq!(payload.reported_classification(), None);
    }

    #[test]
    fn test_payload_missing_field_is_rejected() {
        let raw = r#"{"timestamp": 1.0, "dominant_freq": "x", "status": "NORMAL"}"#;
        assert!(serde_json::from_str::<TelemetryPayload>(raw).is_err());
    }
}
