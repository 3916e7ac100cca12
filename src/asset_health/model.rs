//! Efficiency, power and emissions model for a centrifugal pump.
//!
//! # Degradation curve
//!
//! Efficiency holds at the design value up to 0.15 in/s RMS, then falls by
//! 0.4 per in/s RMS with a floor of 0.40:
//!
//! ```text
//! efficiency = max(0.40, base - (v - 0.15) * 0.4)   for v > 0.15
//! efficiency = base                                  otherwise
//! ```
//!
//! Power scales inversely with efficiency (pump affinity at constant duty):
//! `actual_kw = ideal_kw * base / efficiency`. Anything above the ideal draw is
//! waste, converted to emissions with the grid factor.

use super::{
    classify, fmea_table, spectral_buckets, HealthError, Vibration, DEGRADATION_ONSET_RMS,
    DEGRADATION_SLOPE, EFFICIENCY_FLOOR,
};
use crate::config::{defaults::HOURS_PER_YEAR, PhysicsConfig};
use crate::types::{Evaluation, FaultClassification, FmeaTable, PowerWaste, SpectralBuckets};

/// Stateless asset health model parameterised by the plant's physics constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetHealthModel {
    physics: PhysicsConfig,
}

impl Default for AssetHealthModel {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl AssetHealthModel {
    pub fn new(physics: PhysicsConfig) -> Self {
        Self { physics }
    }

    /// Build from the global configuration.
    pub fn from_config() -> Self {
        Self::new(crate::config::get().physics)
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    /// Classification and its dominant frequency label.
    pub fn classify(&self, vibration: Vibration) -> (FaultClassification, &'static str) {
        let classification = classify(vibration);
        (classification, classification.dominant_frequency())
    }

    /// Pump efficiency at the given vibration level.
    ///
    /// Always within `[0.40, base_efficiency]`.
    pub fn estimate_efficiency(&self, vibration: Vibration) -> f64 {
        let base = self.physics.base_efficiency;
        let v = vibration.rms();
        if v > DEGRADATION_ONSET_RMS {
            (base - (v - DEGRADATION_ONSET_RMS) * DEGRADATION_SLOPE).max(EFFICIENCY_FLOOR)
        } else {
            base
        }
    }

    /// Power draw and excess emissions at the given efficiency.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `efficiency` is not a positive finite number. Values
    /// from [`estimate_efficiency`](Self::estimate_efficiency) always pass.
    pub fn estimate_power_waste(&self, efficiency: f64) -> Result<PowerWaste, HealthError> {
        if !efficiency.is_finite() || efficiency <= 0.0 {
            return Err(HealthError::InvalidInput {
                field: "efficiency",
                value: efficiency,
                reason: "must be > 0",
            });
        }

        let p = &self.physics;
        let actual_power_kw = p.ideal_power_kw * (p.base_efficiency / efficiency);
        let excess_kw = (actual_power_kw - p.ideal_power_kw).max(0.0);

        Ok(PowerWaste {
            actual_power_kw,
            excess_kw,
            excess_co2_lbs_per_hour: excess_kw * p.co2_lbs_per_kwh,
        })
    }

    /// Annual cost (USD) of the excess energy behind a carbon waste rate.
    ///
    /// Non-positive rates cost nothing.
    pub fn annual_waste_cost(&self, carbon_waste_lbs_per_hr: f64) -> f64 {
        let p = &self.physics;
        let excess_kw = if carbon_waste_lbs_per_hr > 0.0 {
            carbon_waste_lbs_per_hr / p.co2_lbs_per_kwh
        } else {
            0.0
        };
        excess_kw * p.energy_rate_usd_per_kwh * HOURS_PER_YEAR
    }

    pub fn fmea_table(&self, vibration: Vibration) -> FmeaTable {
        fmea_table(vibration)
    }

    pub fn spectral_buckets(&self, vibration: Vibration) -> SpectralBuckets {
        spectral_buckets(vibration)
    }

    /// Full evaluation of a validated reading.
    pub fn evaluate_reading(&self, vibration: Vibration) -> Evaluation {
        let (classification, dominant_freq) = self.classify(vibration);
        let efficiency = self.estimate_efficiency(vibration);
        // Efficiency is floored at 0.40, so this cannot fail
        let power = self
            .estimate_power_waste(efficiency)
            .unwrap_or(PowerWaste {
                actual_power_kw: self.physics.ideal_power_kw,
                excess_kw: 0.0,
                excess_co2_lbs_per_hour: 0.0,
            });

        tracing::trace!(
            vibration = vibration.rms(),
            classification = %classification,
            efficiency = efficiency,
            actual_power_kw = power.actual_power_kw,
            "Evaluated vibration reading"
        );

        Evaluation {
            vibration: vibration.rms(),
            classification,
            dominant_freq,
            efficiency,
            actual_power_kw: power.actual_power_kw,
            excess_co2_lbs_per_hour: power.excess_co2_lbs_per_hour,
            fmea_table: fmea_table(vibration),
            spectral_buckets: spectral_buckets(vibration),
        }
    }

    /// Validate a raw reading and evaluate it.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for negative or non-finite readings.
    pub fn evaluate(&self, vibration: f64) -> Result<Evaluation, HealthError> {
        Ok(self.evaluate_reading(Vibration::new(vibration)?))
    }
}
