//! API request handlers
//!
//! All handlers return `Response` via [`ApiResponse::ok`] or [`ApiErrorResponse`].
//! Body and query rejections are mapped into the same error envelope.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::asset_health::{AssetHealthModel, Vibration};
use crate::config::AssetInfo;
use crate::context::{ContextField, ContextSnapshot, ReadingSource, SharedContext};
use crate::narrative::{NarrativeGenerator, SopDocument, TemplateGenerator};
use crate::types::TelemetryPayload;
use crate::views::{self, Pillar, TwinMode};

/// Shared state for API handlers
#[derive(Clone)]
pub struct DashboardState {
    /// Process-wide dashboard context
    pub context: Arc<SharedContext>,
    /// Asset health model with the deployment's physics constants
    pub model: AssetHealthModel,
    /// Backend for SOP and X-Matrix text
    pub generator: Arc<dyn NarrativeGenerator>,
    /// Monitored asset
    pub asset: AssetInfo,
    /// A telemetry feed is running
    pub live: bool,
}

impl DashboardState {
    pub fn new(
        context: Arc<SharedContext>,
        model: AssetHealthModel,
        generator: Arc<dyn NarrativeGenerator>,
        asset: AssetInfo,
    ) -> Self {
        Self {
            context,
            model,
            generator,
            asset,
            live: false,
        }
    }

    /// State built from the global config with the template generator.
    pub fn from_config(context: Arc<SharedContext>) -> Self {
        Self::new(
            context,
            AssetHealthModel::from_config(),
            Arc::new(TemplateGenerator::new()),
            crate::config::get().asset.clone(),
        )
    }

    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }
}

// ============================================================================
// Request / response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SetVibrationRequest {
    pub vibration: f64,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateQuery {
    /// Reading to evaluate; the current context reading when absent
    pub vibration: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct StrategyQuery {
    pub pillar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TwinQuery {
    pub mode: Option<TwinMode>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub asset_id: String,
    pub live: bool,
    pub generator: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SopResponse {
    pub sop: SopDocument,
    pub markdown: String,
}

#[derive(Debug, Serialize)]
pub struct TelemetryLatestResponse {
    pub live: bool,
    pub source: ReadingSource,
    pub payload: TelemetryPayload,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health_check(State(state): State<DashboardState>) -> Response {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        asset_id: state.asset.id.clone(),
        live: state.live,
        generator: state.generator.generator_name(),
    })
}

/// GET /api/v1/context
pub async fn get_context(State(state): State<DashboardState>) -> Response {
    ApiResponse::ok(state.context.get())
}

/// POST /api/v1/context/vibration  `{"vibration": 0.35}`
pub async fn set_vibration(
    State(state): State<DashboardState>,
    body: Result<Json<SetVibrationRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(b) => b,
        Err(rejection) => return ApiErrorResponse::from_json_rejection(&rejection),
    };

    match state.context.set(ContextField::CurrentVibration, request.vibration) {
        Ok(snapshot) => {
            info!(vibration = request.vibration, "Vibration set by operator");
            ApiResponse::ok(snapshot)
        }
        Err(e) => ApiErrorResponse::bad_request(e.to_string()),
    }
}

/// POST /api/v1/context/reset
pub async fn reset_context(State(state): State<DashboardState>) -> Response {
    ApiResponse::ok(state.context.reset())
}

/// GET /api/v1/evaluate?vibration=0.35
pub async fn evaluate(
    State(state): State<DashboardState>,
    query: Result<Query<EvaluateQuery>, QueryRejection>,
) -> Response {
    let Query(q) = match query {
        Ok(q) => q,
        Err(rejection) => return ApiErrorResponse::from_query_rejection(&rejection),
    };

    let vibration = match q.vibration {
        Some(raw) => match Vibration::new(raw) {
            Ok(v) => v,
            Err(e) => return ApiErrorResponse::bad_request(e.to_string()),
        },
        None => state.context.get().current_vibration,
    };

    ApiResponse::ok(state.model.evaluate_reading(vibration))
}

/// GET /api/v1/strategy?pillar=sustainability
pub async fn get_strategy(
    State(state): State<DashboardState>,
    query: Result<Query<StrategyQuery>, QueryRejection>,
) -> Response {
    let Query(q) = match query {
        Ok(q) => q,
        Err(rejection) => return ApiErrorResponse::from_query_rejection(&rejection),
    };

    let pillar = match q.pillar.as_deref().map(str::parse::<Pillar>) {
        None => Pillar::Sustainability,
        Some(Ok(p)) => p,
        Some(Err(msg)) => return ApiErrorResponse::bad_request(msg),
    };

    let snapshot = state.context.get();
    ApiResponse::ok(views::build_strategy_view(
        pillar,
        &snapshot,
        &state.model,
        &state.asset.plant,
    ))
}

/// POST /api/v1/strategy/x-matrix
pub async fn generate_x_matrix(State(state): State<DashboardState>) -> Response {
    match state.generator.generate_x_matrix().await {
        Ok(matrix) => ApiResponse::ok(matrix),
        Err(e) => {
            error!(generator = state.generator.generator_name(), error = %e, "X-Matrix generation failed");
            ApiErrorResponse::internal(format!("X-Matrix generation failed: {e}"))
        }
    }
}

/// GET /api/v1/twin?mode=manual|live
///
/// Renders and commits the updated carbon waste under one context update.
pub async fn get_twin(
    State(state): State<DashboardState>,
    query: Result<Query<TwinQuery>, QueryRejection>,
) -> Response {
    let Query(q) = match query {
        Ok(q) => q,
        Err(rejection) => return ApiErrorResponse::from_query_rejection(&rejection),
    };
    let mode = q
        .mode
        .unwrap_or(if state.live { TwinMode::Live } else { TwinMode::Manual });

    let (result, rendered) = {
        let mut rng = rand::thread_rng();
        let mut rendered = None;
        let result = state.context.update(|snapshot: &ContextSnapshot| {
            let (view, next) = views::render_twin(
                snapshot,
                &state.model,
                &state.asset.id,
                mode,
                Utc::now(),
                &mut rng,
            )?;
            rendered = Some(view);
            Ok(next)
        });
        (result, rendered)
    };

    match (result, rendered) {
        (Ok(_), Some(view)) => ApiResponse::ok(view),
        (Err(e), _) => ApiErrorResponse::internal(format!("Digital twin render failed: {e}")),
        (Ok(_), None) => ApiErrorResponse::internal("Digital twin produced no view"),
    }
}

/// GET /api/v1/rca
pub async fn get_rca(State(state): State<DashboardState>) -> Response {
    let snapshot = state.context.get();
    ApiResponse::ok(views::build_rca_view(&snapshot, &state.model, &state.asset.id))
}

/// POST /api/v1/rca/sop
pub async fn generate_sop(State(state): State<DashboardState>) -> Response {
    let snapshot = state.context.get();
    match views::generate_sop(&snapshot, &state.model, state.generator.as_ref(), &state.asset.id).await {
        Ok(Some(sop)) => {
            let markdown = sop.to_markdown();
            ApiResponse::ok(SopResponse { sop, markdown })
        }
        Ok(None) => ApiErrorResponse::conflict(format!(
            "Asset #{} is operating within normal parameters; no SOP required",
            state.asset.id
        )),
        Err(e) => {
            error!(generator = state.generator.generator_name(), error = %e, "SOP generation failed");
            ApiErrorResponse::internal(format!("SOP generation failed: {e}"))
        }
    }
}

/// GET /api/v1/telemetry/latest
pub async fn get_latest_telemetry(State(state): State<DashboardState>) -> Response {
    let snapshot = state.context.get();
    match snapshot.last_payload {
        Some(payload) => ApiResponse::ok(TelemetryLatestResponse {
            live: state.live,
            source: snapshot.source,
            payload,
            updated_at: snapshot.updated_at,
        }),
        None => ApiErrorResponse::not_found("No telemetry received yet"),
    }
}
