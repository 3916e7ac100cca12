//! API route definitions
//!
//! - /api/v1/context - shared dashboard context
//! - /api/v1/evaluate - asset health evaluation of a single reading
//! - /api/v1/strategy - Hoshin Kanri cascade and X-Matrix
//! - /api/v1/twin - operational digital twin
//! - /api/v1/rca - RCA copilot and sustainment SOP
//! - /api/v1/telemetry/latest - last accepted telemetry message

use axum::{routing::{get, post}, Router};

use super::handlers::{self, DashboardState};

/// Create all versioned API routes
pub fn api_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/context", get(handlers::get_context))
        .route("/context/vibration", post(handlers::set_vibration))
        .route("/context/reset", post(handlers::reset_context))
        .route("/evaluate", get(handlers::evaluate))
        .route("/strategy", get(handlers::get_strategy))
        .route("/strategy/x-matrix", post(handlers::generate_x_matrix))
        .route("/twin", get(handlers::get_twin))
        .route("/rca", get(handlers::get_rca))
        .route("/rca/sop", post(handlers::generate_sop))
        .route("/telemetry/latest", get(handlers::get_latest_telemetry))
        .with_state(state)
}

/// Health endpoint at root level
pub fn health_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SharedContext;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_state() -> DashboardState {
        DashboardState::from_config(Arc::new(SharedContext::new()))
    }

    async fn get_status(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_route() {
        let app = health_routes(create_test_state());
        assert_eq!(get_status(app, "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_read_only_routes() {
        let state = create_test_state();
        for uri in ["/context", "/evaluate", "/strategy", "/twin", "/rca"] {
            let status = get_status(api_routes(state.clone()), uri).await;
            assert_eq!(status, StatusCode::OK, "GET {uri}");
        }
    }

    #[tokio::test]
    async fn test_telemetry_latest_without_feed() {
        let app = api_routes(create_test_state());
        assert_eq!(get_status(app, "/telemetry/latest").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sop_conflict_when_healthy() {
        let app = api_routes(create_test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rca/sop")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
