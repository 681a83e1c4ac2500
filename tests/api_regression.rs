//! Regression tests for the HTTP API surface.
//!
//! Exercises each endpoint with `tower::ServiceExt::oneshot` against a
//! monitor wired to scripted collaborators, checking status codes and the
//! response envelope rather than internal state.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;

use pipeline_sentinel::api::create_app;
use pipeline_sentinel::config::MonitorConfig;
use pipeline_sentinel::monitor::PipelineMonitor;
use pipeline_sentinel::probe::sim::ScriptedProbe;
use pipeline_sentinel::recovery::sim::ScriptedRecovery;
use pipeline_sentinel::types::Component;

/// Monitor with deterministic probes: every component healthy unless listed.
fn scripted_monitor(failing: &[(Component, usize, &str)]) -> PipelineMonitor {
    let mut builder = PipelineMonitor::builder(MonitorConfig::default())
        .recovery_runner(Arc::new(ScriptedRecovery::succeeding()));
    for component in Component::ALL {
        let probe = match failing.iter().find(|(c, _, _)| *c == component) {
            Some(&(_, failures, error)) => ScriptedProbe::failing_times(failures, error),
            None => ScriptedProbe::healthy(),
        };
        builder = builder.probe(component, Arc::new(probe));
    }
    builder.build()
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_status_endpoint_shape() {
    let monitor = scripted_monitor(&[]);
    monitor.force_check().await;

    let (status, body) = get(create_app(monitor), "/api/pipeline/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["overall_status"], "healthy");
    let components = body["data"]["components"].as_object().unwrap();
    assert_eq!(components.len(), 5);
    assert_eq!(components["network"], "healthy");
    assert!(body["meta"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_editor_message_reports_publishable() {
    let monitor = scripted_monitor(&[]);
    monitor.force_check().await;

    let (status, body) = get(create_app(monitor), "/api/pipeline/editor-message").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["can_publish"], true);
    assert!(body["data"]["message"].as_str().unwrap().contains("OPERATIONAL"));
}

#[tokio::test]
async fn test_editor_message_blocks_on_validation_failure() {
    let monitor = scripted_monitor(&[(
        Component::ValidationService,
        1,
        "Validation service unresponsive",
    )]);
    monitor.force_check().await;

    let (status, body) = get(create_app(monitor), "/api/pipeline/editor-message").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["can_publish"], false);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let monitor = scripted_monitor(&[]);
    monitor.force_check().await;
    monitor.force_check().await;

    let (status, body) = get(create_app(monitor), "/api/pipeline/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_checks"], 10);
    assert_eq!(body["data"]["failed_checks"], 0);
    assert_eq!(body["data"]["success_rate"], 100.0);
}

#[tokio::test]
async fn test_history_respects_limit() {
    let monitor = scripted_monitor(&[]);
    monitor.force_check().await;
    monitor.force_check().await;

    let (status, body) = get(create_app(monitor.clone()), "/api/pipeline/history?limit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 3);
    assert_eq!(body["data"]["events"].as_array().unwrap().len(), 3);

    // Without a limit the default window applies; two rounds fit inside it.
    let (_, body) = get(create_app(monitor), "/api/pipeline/history").await;
    assert_eq!(body["data"]["count"], 10);
}

#[tokio::test]
async fn test_force_check_runs_a_round() {
    let monitor = scripted_monitor(&[]);

    let (status, body) = post(create_app(monitor.clone()), "/api/pipeline/force-check").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["components"].as_object().unwrap().len(), 5);
    assert_eq!(monitor.get_metrics().await.total_checks, 5);
}

#[tokio::test]
async fn test_recovery_unknown_component_is_400() {
    let monitor = scripted_monitor(&[]);
    let (status, body) = post(create_app(monitor), "/api/pipeline/recovery/blockchain").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_recovery_on_healthy_component_is_skipped() {
    let monitor = scripted_monitor(&[]);
    monitor.force_check().await;

    let (status, body) = post(create_app(monitor), "/api/pipeline/recovery/network").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "skipped");
}

#[tokio::test]
async fn test_manual_recovery_of_failed_component() {
    let monitor = scripted_monitor(&[(
        Component::ValidationService,
        1,
        "Validation service unresponsive",
    )]);
    monitor.force_check().await;

    let (status, body) = post(
        create_app(monitor),
        "/api/pipeline/recovery/validation_service",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], true);
    assert_eq!(body["data"]["action"], "restart");
    assert_eq!(body["data"]["component"], "validation_service");
}

#[tokio::test]
async fn test_concurrent_recovery_is_409() {
    let mut builder = PipelineMonitor::builder(MonitorConfig::default())
        .recovery_runner(Arc::new(ScriptedRecovery::succeeding_after(
            Duration::from_millis(300),
        )));
    for component in Component::ALL {
        let probe = if component == Component::Network {
            ScriptedProbe::failing_times(5, "Network timeout")
        } else {
            ScriptedProbe::healthy()
        };
        builder = builder.probe(component, Arc::new(probe));
    }
    let monitor = builder.build();

    // The round reserves the automatic RECONNECT before returning.
    monitor.force_check().await;

    let (status, body) = post(create_app(monitor), "/api/pipeline/recovery/network").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}
