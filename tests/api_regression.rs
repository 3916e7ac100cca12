//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! the /api/v1/* endpoints using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port.

use lean_nexus::api::{create_app, DashboardState};
use lean_nexus::config::{self, NexusConfig};
use lean_nexus::SharedContext;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;

fn ensure_config() {
    if !config::is_initialized() {
        config::init(NexusConfig::default());
    }
}

fn create_test_app() -> (Router, Arc<SharedContext>) {
    ensure_config();
    let context = Arc::new(SharedContext::new());
    let app = create_app(DashboardState::from_config(Arc::clone(&context)));
    (app, context)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let req = builder
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// All read-only GET endpoints should return 200 with the envelope.
#[tokio::test]
async fn test_get_endpoints_return_200() {
    let (app, _) = create_test_app();

    let endpoints = [
        "/health",
        "/api/v1/context",
        "/api/v1/evaluate",
        "/api/v1/evaluate?vibration=0.35",
        "/api/v1/strategy",
        "/api/v1/strategy?pillar=safety",
        "/api/v1/twin",
        "/api/v1/rca",
    ];

    for endpoint in &endpoints {
        let (status, json) = send(&app, "GET", endpoint, None).await;
        assert_eq!(status, StatusCode::OK, "GET {endpoint}");
        assert!(json.get("data").is_some(), "GET {endpoint} missing data");
        assert_eq!(json["meta"]["version"], "1", "GET {endpoint} missing meta");
    }
}

#[tokio::test]
async fn test_evaluate_scenarios() {
    let (app, _) = create_test_app();

    let (_, json) = send(&app, "GET", "/api/v1/evaluate?vibration=0.05", None).await;
    assert_eq!(json["data"]["classification"], "NORMAL");
    assert_eq!(json["data"]["dominant_freq"], "None (Noise Floor)");

    let (_, json) = send(&app, "GET", "/api/v1/evaluate?vibration=0.35", None).await;
    assert_eq!(json["data"]["classification"], "WARNING");
    let co2 = json["data"]["excess_co2_lbs_per_hour"].as_f64().unwrap();
    assert!((co2 - 5.74).abs() < 0.01);

    let (_, json) = send(&app, "GET", "/api/v1/evaluate?vibration=0.6", None).await;
    assert_eq!(json["data"]["classification"], "CRITICAL");
    assert_eq!(json["data"]["fmea_table"]["rows"][0]["failure_mode"], "Mechanical Looseness");
    assert_eq!(json["data"]["spectral_buckets"]["1x RPM"], 0.8);
}

#[tokio::test]
async fn test_evaluate_rejects_invalid_readings() {
    let (app, _) = create_test_app();

    for uri in [
        "/api/v1/evaluate?vibration=-0.1",
        "/api/v1/evaluate?vibration=abc",
        "/api/v1/evaluate?vibration=NaN",
    ] {
        let (status, json) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "GET {uri}");
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn test_set_vibration_and_reset() {
    let (app, context) = create_test_app();

    let (status, json) = send(&app, "POST", "/api/v1/context/vibration", Some(r#"{"vibration": 0.42}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["current_vibration"], 0.42);
    assert_eq!(json["data"]["source"], "manual");
    assert!((context.get().vibration_rms() - 0.42).abs() < f64::EPSILON);

    let (status, _) = send(&app, "POST", "/api/v1/context/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    let snap = context.get();
    assert!((snap.vibration_rms() - 0.05).abs() < f64::EPSILON);
    assert_eq!(snap.carbon_waste, 0.0);
}

#[tokio::test]
async fn test_set_vibration_rejects_bad_bodies() {
    let (app, context) = create_test_app();

    for body in [r#"{"vibration": -1.0}"#, r#"{"vibration": "high"}"#, "not json"] {
        let (status, json) = send(&app, "POST", "/api/v1/context/vibration", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }
    assert!((context.get().vibration_rms() - 0.05).abs() < f64::EPSILON);
}

/// Twin writes carbon waste back; strategy then reports the deviation.
#[tokio::test]
async fn test_twin_feeds_strategy_deviation() {
    let (app, context) = create_test_app();

    send(&app, "POST", "/api/v1/context/vibration", Some(r#"{"vibration": 0.35}"#)).await;

    let (status, twin) = send(&app, "GET", "/api/v1/twin", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(twin["data"]["vibration"]["delta"], "ALARM");
    assert_eq!(twin["data"]["trend"].as_array().unwrap().len(), 24);
    assert!((context.get().carbon_waste - 5.74).abs() < 0.01);

    let (_, strategy) = send(&app, "GET", "/api/v1/strategy?pillar=sustainability", None).await;
    assert_eq!(strategy["data"]["l2"]["status"], "AT RISK");
    assert_eq!(
        strategy["data"]["l2"]["deviation"],
        "5.74 lbs/hr excess carbon from Assets"
    );

    let (_, opex) = send(&app, "GET", "/api/v1/strategy?pillar=operational_excellence", None).await;
    assert_eq!(opex["data"]["l2"]["deviation"], "$7,099 / yr excess energy waste");
}

/// Strategy figures follow the latest reading even when the twin was never rendered for it.
#[tokio::test]
async fn test_strategy_tracks_reading_without_twin() {
    let (app, _) = create_test_app();

    send(&app, "POST", "/api/v1/context/vibration", Some(r#"{"vibration": 0.6}"#)).await;
    let (_, opex) = send(&app, "GET", "/api/v1/strategy?pillar=operational_excellence", None).await;
    assert_eq!(opex["data"]["l2"]["status"], "AT RISK");
    assert_eq!(opex["data"]["l2"]["deviation"], "$18,357 / yr excess energy waste");

    // Twin stores the 0.6 waste, then the reading drops to 0.35
    send(&app, "GET", "/api/v1/twin", None).await;
    send(&app, "POST", "/api/v1/context/vibration", Some(r#"{"vibration": 0.35}"#)).await;
    let (_, sustainability) = send(&app, "GET", "/api/v1/strategy?pillar=sustainability", None).await;
    assert_eq!(
        sustainability["data"]["l2"]["deviation"],
        "5.74 lbs/hr excess carbon from Assets"
    );
}

#[tokio::test]
async fn test_unknown_pillar_is_bad_request() {
    let (app, _) = create_test_app();
    let (status, json) = send(&app, "GET", "/api/v1/strategy?pillar=finance", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"].as_str().unwrap().contains("finance"));
}

#[tokio::test]
async fn test_rca_and_sop_flow() {
    let (app, _) = create_test_app();

    let (_, healthy) = send(&app, "GET", "/api/v1/rca", None).await;
    assert_eq!(healthy["data"]["status"], "healthy");
    let (status, _) = send(&app, "POST", "/api/v1/rca/sop", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(&app, "POST", "/api/v1/context/vibration", Some(r#"{"vibration": 0.45}"#)).await;

    let (_, alert) = send(&app, "GET", "/api/v1/rca", None).await;
    assert_eq!(alert["data"]["status"], "alert");
    assert_eq!(alert["data"]["fmea"]["profile"], "misalignment");

    let (status, sop) = send(&app, "POST", "/api/v1/rca/sop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sop["data"]["sop"]["document_id"], "JCMS-M-04");
    assert!(sop["data"]["markdown"]
        .as_str()
        .unwrap()
        .contains("Laser Shaft Alignment"));
}

#[tokio::test]
async fn test_x_matrix_generation() {
    let (app, _) = create_test_app();
    let (status, json) = send(&app, "POST", "/api/v1/strategy/x-matrix", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["rows"].as_array().unwrap().len(), 3);
    assert_eq!(json["data"]["source"], "template");
}

#[tokio::test]
async fn test_unknown_path_uses_error_envelope() {
    let (app, _) = create_test_app();
    let (status, json) = send(&app, "GET", "/api/v1/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}
