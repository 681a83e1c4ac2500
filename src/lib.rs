//! Pipeline Sentinel: publishing pipeline health monitoring and recovery.
//!
//! Watches the dependent services a publishing pipeline relies on (network,
//! validation microservice, database, storage, message queue), classifies
//! their health, auto-recovers what can be auto-recovered, and exposes one
//! consistent operational snapshot to editors, engineers, and automation.
//!
//! ## Architecture
//!
//! - **Health Check Engine**: timer-driven rounds of concurrent, time-bounded
//!   probes ([`monitor`])
//! - **Failure Detector**: edge-triggered detection and alerting, once per
//!   transition into FAILED
//! - **Recovery Orchestrator**: per-component state machine, at most one
//!   recovery in flight per component
//! - **Metrics & Audit**: monotonic counters plus an append-only, queryable
//!   event history ([`audit`])
//! - **Status Synthesizer**: overall status, editor message, and suggested
//!   actions derived on demand, never cached

pub mod alert;
pub mod api;
pub mod audit;
pub mod config;
pub mod monitor;
pub mod probe;
pub mod recovery;
pub mod types;

// Re-export the construction and query surface
pub use config::MonitorConfig;
pub use monitor::{MonitorBuilder, MonitorError, PipelineMonitor};

// Re-export commonly used types
pub use types::{
    Component, EditorMessage, HealthCheckResult, HealthStatus, MetricsSnapshot, PipelineStatus,
    RecoveryAction, RecoveryAttempt, Severity,
};

// Re-export collaborator contracts
pub use alert::AlertSink;
pub use probe::{Probe, ProbeError, ProbeHealth};
pub use recovery::{RecoveryError, RecoveryRunner};
