//! Simulated pump vibration sensor.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::asset_health::{classify, Vibration};
use crate::config::defaults::{MOCK_SENSOR_MAX_RMS, MOCK_SENSOR_MIN_RMS};
use crate::types::{FaultClassification, TelemetryPayload};

/// Draws readings uniformly from [0.02, 0.8] in/s RMS, rounded to 3 decimals.
pub struct MockSensor {
    rng: StdRng,
}

impl MockSensor {
    /// Seeded for reproducible runs, from entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Next payload, classified with the local model and stamped now.
    pub fn sample(&mut self) -> TelemetryPayload {
        let raw: f64 = self.rng.gen_range(MOCK_SENSOR_MIN_RMS..=MOCK_SENSOR_MAX_RMS);
        let rms = (raw * 1000.0).round() / 1000.0;
        // Sampled range is always a valid reading
        let classification = Vibration::new(rms).map_or(FaultClassification::Normal, classify);

        #[allow(clippy::cast_precision_loss)]
        let timestamp = Utc::now().timestamp_millis() as f64 / 1000.0;

        TelemetryPayload {
            timestamp,
            vibration_rms: rms,
            dominant_freq: classification.dominant_frequency().to_string(),
            status: classification.as_str().to_string(),
        }
    }
}
