//! HTTP handlers: thin adapters from the transport to the monitor.
//!
//! Editors and automation consume these; no raw probe errors ever appear in
//! a response body.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::monitor::{MonitorError, PipelineMonitor};
use crate::types::{Component, HealthStatus};

/// GET / — service index.
pub async fn root() -> Response {
    ApiResponse::ok(json!({
        "service": "Publishing Pipeline Monitor",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "status": "/api/pipeline/status",
            "editor_message": "/api/pipeline/editor-message",
            "metrics": "/api/pipeline/metrics",
            "history": "/api/pipeline/history",
            "recovery": "/api/pipeline/recovery/{component}",
            "force_check": "/api/pipeline/force-check",
            "health": "/api/health",
        },
    }))
}

/// GET /api/health — liveness of the monitoring service itself.
pub async fn get_health() -> Response {
    ApiResponse::ok(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// GET /api/pipeline/status — full engineer-facing snapshot.
pub async fn get_status(State(monitor): State<PipelineMonitor>) -> Response {
    ApiResponse::ok(monitor.get_pipeline_status().await)
}

/// GET /api/pipeline/editor-message — editor-facing publish signal.
pub async fn get_editor_message(State(monitor): State<PipelineMonitor>) -> Response {
    ApiResponse::ok(monitor.get_editor_message().await)
}

/// GET /api/pipeline/metrics — counters and derived rates.
pub async fn get_metrics(State(monitor): State<PipelineMonitor>) -> Response {
    ApiResponse::ok(monitor.get_metrics().await)
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

/// GET /api/pipeline/history?limit=N — recent audit events, newest first.
pub async fn get_history(
    State(monitor): State<PipelineMonitor>,
    Query(params): Query<HistoryParams>,
) -> Response {
    let events = monitor.history(params.limit).await;
    ApiResponse::ok(json!({
        "events": events,
        "count": events.len(),
    }))
}

/// POST /api/pipeline/recovery/:component — manual recovery trigger.
pub async fn trigger_recovery(
    State(monitor): State<PipelineMonitor>,
    Path(component): Path<String>,
) -> Response {
    let component: Component = match component.parse() {
        Ok(c) => c,
        Err(e) => return ApiErrorResponse::bad_request(e.to_string()),
    };

    // No point restarting something that is up.
    if monitor.component_status(component).await == HealthStatus::Healthy {
        return ApiResponse::ok(json!({
            "status": "skipped",
            "message": format!("{component} is already healthy"),
            "component": component,
        }));
    }

    match monitor.attempt_recovery(component).await {
        Ok(attempt) => ApiResponse::ok(attempt),
        Err(e @ MonitorError::RecoveryInProgress(_)) => ApiErrorResponse::conflict(e.to_string()),
        Err(e @ MonitorError::InvalidComponent(_)) => ApiErrorResponse::bad_request(e.to_string()),
        Err(e) => ApiErrorResponse::internal(e.to_string()),
    }
}

/// POST /api/pipeline/force-check — run one round now, return the status.
pub async fn force_check(State(monitor): State<PipelineMonitor>) -> Response {
    ApiResponse::ok(monitor.force_check().await)
}
