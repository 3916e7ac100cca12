//! JSON-lines framing for telemetry envelopes.

use super::TelemetryError;
use crate::types::TelemetryEnvelope;

/// Decode one line into an envelope.
///
/// # Errors
///
/// Blank lines, invalid JSON and missing fields are `Malformed`.
pub fn decode_line(line: &str) -> Result<TelemetryEnvelope, TelemetryError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(TelemetryError::Malformed("empty line".to_string()));
    }
    serde_json::from_str(trimmed).map_err(|e| TelemetryError::Malformed(e.to_string()))
}

/// Encode an envelope as a single newline-terminated line.
///
/// # Errors
///
/// Fails only if the payload holds a non-finite number.
pub fn encode_line(envelope: &TelemetryEnvelope) -> Result<String, TelemetryError> {
    if !envelope.payload.vibration_rms.is_finite() || !envelope.payload.timestamp.is_finite() {
        return Err(TelemetryError::Malformed(
            "payload contains a non-finite number".to_string(),
        ));
    }
    let mut line =
        serde_json::to_string(envelope).map_err(|e| TelemetryError::Malformed(e.to_string()))?;
    line.push('\n');
    Ok(line)
}
