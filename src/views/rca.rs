//! RCA copilot: diagnostics and sustainment SOP for an alarming asset.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use super::format_reading;
use crate::asset_health::AssetHealthModel;
use crate::context::ContextSnapshot;
use crate::narrative::{NarrativeGenerator, SopDocument, SopRequest};
use crate::types::{FaultClassification, FmeaTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RcaStatus {
    Healthy,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RcaView {
    pub asset_id: String,
    pub vibration: f64,
    pub classification: FaultClassification,
    pub status: RcaStatus,
    pub message: String,
    /// Spectral analysis headline, alert only
    pub spectral_result: Option<String>,
    /// Step 1 diagnostics, alert only
    pub fmea: Option<FmeaTable>,
    /// Step 2: an SOP can be generated for this state
    pub sop_available: bool,
}

pub fn build_rca_view(snapshot: &ContextSnapshot, model: &AssetHealthModel, asset_id: &str) -> RcaView {
    let evaluation = model.evaluate_reading(snapshot.current_vibration);
    let reading = format_reading(evaluation.vibration);

    if !evaluation.is_alarm() {
        return RcaView {
            asset_id: asset_id.to_string(),
            vibration: evaluation.vibration,
            classification: evaluation.classification,
            status: RcaStatus::Healthy,
            message: format!(
                "Asset #{asset_id} is operating within normal parameters. \
                 Current Vibration: {reading} in/s. No active anomalies."
            ),
            spectral_result: None,
            fmea: None,
            sop_available: false,
        };
    }

    RcaView {
        asset_id: asset_id.to_string(),
        vibration: evaluation.vibration,
        classification: evaluation.classification,
        status: RcaStatus::Alert,
        message: format!(
            "{} ALERT: Vibration {reading} in/s detected on Asset #{asset_id}",
            evaluation.classification
        ),
        spectral_result: Some(format!(
            "Strong peak detected at {}.",
            evaluation.dominant_freq
        )),
        fmea: Some(evaluation.fmea_table),
        sop_available: true,
    }
}

/// Generate the sustainment SOP, or `None` when the asset is healthy.
///
/// # Errors
///
/// Propagates generator failures.
pub async fn generate_sop(
    snapshot: &ContextSnapshot,
    model: &AssetHealthModel,
    generator: &dyn NarrativeGenerator,
    asset_id: &str,
) -> Result<Option<SopDocument>> {
    let evaluation = model.evaluate_reading(snapshot.current_vibration);
    if !evaluation.is_alarm() {
        return Ok(None);
    }

    info!(
        asset = asset_id,
        generator = generator.generator_name(),
        classification = %evaluation.classification,
        "Generating sustainment SOP"
    );

    let request = SopRequest {
        asset_id: asset_id.to_string(),
        evaluation,
    };
    generator.generate_sop(&request).await.map(Some)
}
