//! HTTP contract tests against the assembled router: response shapes,
//! status codes, and streaming headers.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use arbiter_api::state::{AppConfig, AppState};
use arbiter_api::{app, routes::health::HealthResponse};
use arbiter_engine::ScriptedEngine;

fn test_app(engine: ScriptedEngine) -> axum::Router {
    app(AppState::new(Arc::new(engine), AppConfig::default()))
}

fn valid_body() -> String {
    serde_json::json!({
        "policy": {
            "id": "7b1c9a6e-5f1f-4f6e-8f7c-2e6a1d9b0c3d",
            "creator_id": "3f9d2c71-8a44-4b1e-9c55-6d0e7f8a9b1c",
            "name": "Refund policy",
            "created_at": "2026-08-01T12:00:00Z"
        },
        "opposer_evidences": [],
        "defender_evidences": [],
        "user_query": "Who prevails?"
    })
    .to_string()
}

#[tokio::test]
async fn health_reports_service_and_version() {
    for uri in ["/", "/health"] {
        let response = test_app(ScriptedEngine::silent())
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.service, "ai-arbiter");
        assert!(!health.version.is_empty());
    }
}

#[tokio::test]
async fn stream_responds_with_event_stream_headers() {
    let engine = ScriptedEngine::single_decision(
        r#"{"decision_type":"approve_opposer","decision":"refund","confidence":0.9}"#,
    );
    let response = test_app(engine)
        .oneshot(
            Request::post("/arbitrate/stream")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(valid_body()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache"
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = std::str::from_utf8(&bytes).unwrap();
    // Two framed records: the decision and the terminal.
    assert_eq!(text.matches("data: ").count(), 2);
    assert!(text.ends_with("\n\n"));
}

#[tokio::test]
async fn unary_returns_success_envelope() {
    let engine = ScriptedEngine::single_decision(
        r#"{"decision_type":"approve_opposer","decision":"refund","confidence":0.9}"#,
    );
    let response = test_app(engine)
        .oneshot(
            Request::post("/arbitrate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(valid_body()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["status"], "success");
    assert!(value["result"]["session_id"].is_string());
    assert_eq!(value["result"]["decisions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unary_validation_failure_is_structured_422() {
    let body = valid_body().replace("7b1c9a6e-5f1f-4f6e-8f7c-2e6a1d9b0c3d", "not-a-uuid");
    let response = test_app(ScriptedEngine::silent())
        .oneshot(
            Request::post("/arbitrate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["error"]["code"], "VALIDATION_ERROR");
    assert!(value["error"]["message"].as_str().unwrap().contains("id"));
}

#[tokio::test]
async fn unknown_route_is_404() {
    let response = test_app(ScriptedEngine::silent())
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
