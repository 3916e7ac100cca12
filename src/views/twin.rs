//! Operational digital twin for the monitored pump
//!
//! Evaluates the current reading, builds the metric cards, a synthetic 24h
//! trend ending at the current reading and the spectrum presets. The excess
//! emissions figure is written back into the returned snapshot so the
//! strategy cascade reflects the last twin evaluation.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::asset_health::{AssetHealthModel, ALARM_THRESHOLD_RMS};
use crate::config::defaults::{TREND_HOURS, TREND_NOISE_MAX, TREND_NOISE_MIN};
use crate::context::{ContextError, ContextSnapshot};
use crate::types::{Evaluation, SpectralBuckets, TelemetryPayload};

/// Where the twin's reading comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwinMode {
    /// Operator-set reading
    #[default]
    Manual,
    /// Reading delivered by the telemetry feed
    Live,
}

/// A headline metric with its formatted value and delta badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub label: &'static str,
    pub value: f64,
    pub display: String,
    pub delta: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub time: DateTime<Utc>,
    pub vibration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwinView {
    pub asset_id: String,
    pub mode: TwinMode,
    pub vibration: MetricCard,
    pub efficiency: MetricCard,
    pub carbon_waste: MetricCard,
    pub evaluation: Evaluation,
    pub trend: Vec<TrendPoint>,
    /// ISO 10816 alarm line drawn on the trend
    pub alarm_limit: f64,
    pub spectrum: SpectralBuckets,
    /// Last raw telemetry message, live mode only
    pub raw_payload: Option<TelemetryPayload>,
}

/// Render the twin and return the snapshot to commit.
///
/// # Errors
///
/// Only if the computed emissions figure is not a valid carbon waste rate,
/// which the model never produces for a valid reading.
pub fn render_twin<R: Rng + ?Sized>(
    snapshot: &ContextSnapshot,
    model: &AssetHealthModel,
    asset_id: &str,
    mode: TwinMode,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<(TwinView, ContextSnapshot), ContextError> {
    let evaluation = model.evaluate_reading(snapshot.current_vibration);
    let co2 = evaluation.excess_co2_lbs_per_hour;

    let vibration = MetricCard {
        label: "Real-Time Vibration",
        value: evaluation.vibration,
        display: format!("{:.2} in/s", evaluation.vibration),
        delta: Some(if evaluation.is_alarm() { "ALARM" } else { "Safe" }),
    };
    let efficiency = MetricCard {
        label: "Current Efficiency",
        value: evaluation.efficiency,
        display: format!("{:.1}%", evaluation.efficiency * 100.0),
        delta: None,
    };
    let carbon_waste = MetricCard {
        label: "Carbon Waste Rate",
        value: co2,
        display: format!("{co2:.2} lbs/hr"),
        delta: Some(if co2 > 0.0 { "Excess Waste" } else { "Optimal" }),
    };

    let trend = build_trend(evaluation.vibration, now, rng);
    let updated = snapshot.with_carbon_waste(co2)?;

    debug!(
        vibration = evaluation.vibration,
        classification = %evaluation.classification,
        carbon_waste = co2,
        "Rendered digital twin"
    );

    let view = TwinView {
        asset_id: asset_id.to_string(),
        mode,
        vibration,
        efficiency,
        carbon_waste,
        evaluation,
        trend,
        alarm_limit: ALARM_THRESHOLD_RMS,
        spectrum: evaluation.spectral_buckets,
        raw_payload: match mode {
            TwinMode::Live => snapshot.last_payload.clone(),
            TwinMode::Manual => None,
        },
    };

    Ok((view, updated))
}

/// Hourly points for the last 24h: background noise, then the current reading.
fn build_trend<R: Rng + ?Sized>(current: f64, now: DateTime<Utc>, rng: &mut R) -> Vec<TrendPoint> {
    let hours = i64::from(TREND_HOURS);
    (0..hours)
        .map(|i| {
            let time = now - Duration::hours(hours - 1 - i);
            let vibration = if i == hours - 1 {
                current
            } else {
                rng.gen_range(TREND_NOISE_MIN..=TREND_NOISE_MAX)
            };
            TrendPoint { time, vibration }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_health::Vibration;
    use crate::context::ReadingSource;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn snapshot(rms: f64) -> ContextSnapshot {
        ContextSnapshot::default().with_vibration(Vibration::new(rms).unwrap(), ReadingSource::Manual)
    }

    fn render(snap: &ContextSnapshot, mode: TwinMode) -> (TwinView, ContextSnapshot) {
        let mut rng = StdRng::seed_from_u64(7);
        render_twin(snap, &AssetHealthModel::default(), "P-101", mode, Utc::now(), &mut rng).unwrap()
    }

    #[test]
    fn test_healthy_pump_cards() {
        let (view, updated) = render(&snapshot(0.05), TwinMode::Manual);
        assert_eq!(view.vibration.delta, Some("Safe"));
        assert_eq!(view.efficiency.display, "85.0%");
        assert_eq!(view.carbon_waste.delta, Some("Optimal"));
        assert_eq!(view.carbon_waste.display, "0.00 lbs/hr");
        assert_eq!(updated.carbon_waste, 0.0);
    }

    #[test]
    fn test_misaligned_pump_writes_carbon_waste_back() {
        let before = snapshot(0.35);
        let (view, updated) = render(&before, TwinMode::Manual);
        assert_eq!(view.vibration.delta, Some("ALARM"));
        assert_eq!(view.efficiency.display, "77.0%");
        assert_eq!(view.carbon_waste.delta, Some("Excess Waste"));
        assert!((updated.carbon_waste - 5.74).abs() < 0.01);
        // Input snapshot untouched
        assert_eq!(before.carbon_waste, 0.0);
    }

    #[test]
    fn test_trend_shape() {
        let (view, _) = render(&snapshot(0.6), TwinMode::Manual);
        assert_eq!(view.trend.len(), 24);
        for point in &view.trend[..23] {
            assert!((0.04..=0.07).contains(&point.vibration));
        }
        assert!((view.trend[23].vibration - 0.6).abs() < f64::EPSILON);
        assert!(view.trend.windows(2).all(|w| w[0].time < w[1].time));
        assert!((view.alarm_limit - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_spectrum_matches_classification() {
        let (view, _) = render(&snapshot(0.6), TwinMode::Manual);
        assert!((view.spectrum.one_x - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_raw_payload_only_in_live_mode() {
        let payload = TelemetryPayload {
            timestamp: 1_718_000_000.0,
            vibration_rms: 0.42,
            dominant_freq: "2x RPM (Misalignment)".to_string(),
            status: "WARNING".to_string(),
        };
        let snap = ContextSnapshot::default().with_telemetry(payload).unwrap();

        let (manual, _) = render(&snap, TwinMode::Manual);
        assert!(manual.raw_payload.is_none());

        let (live, _) = render(&snap, TwinMode::Live);
        assert_eq!(live.raw_payload.map(|p| p.vibration_rms), Some(0.42));
    }
}
