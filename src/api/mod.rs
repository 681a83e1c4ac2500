//! REST API module using Axum.
//!
//! Thin transport over [`PipelineMonitor`]: the monitor owns all state and
//! invariants, handlers only translate HTTP to monitor operations.

pub mod envelope;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::monitor::PipelineMonitor;

/// Build the full application router around a monitor handle.
pub fn create_app(monitor: PipelineMonitor) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::get_health))
        .route("/api/pipeline/status", get(handlers::get_status))
        .route(
            "/api/pipeline/editor-message",
            get(handlers::get_editor_message),
        )
        .route("/api/pipeline/metrics", get(handlers::get_metrics))
        .route("/api/pipeline/history", get(handlers::get_history))
        .route(
            "/api/pipeline/recovery/:component",
            post(handlers::trigger_recovery),
        )
        .route("/api/pipeline/force-check", post(handlers::force_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(monitor)
}
