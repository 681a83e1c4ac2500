//! Audit event log and stable audit-line rendering.
//!
//! Every monitoring-relevant occurrence is retained in an append-only,
//! in-memory sequence (insertion order is chronological order) and emitted
//! as one log line with the shape
//!
//! ```text
//! TIMESTAMP - pipeline_audit - LEVEL - TAG: payload
//! ```
//!
//! External log tailers parse these lines, so the format is a contract:
//! TAG is one of HEALTH_CHECK / FAILURE_DETECTED / ALERT_TRIGGERED /
//! RECOVERY_ATTEMPT; LEVEL is INFO for health checks and successful
//! recoveries, ERROR for detected failures and failed recoveries, WARNING
//! for triggered alerts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::types::{Component, HealthCheckResult, RecoveryAttempt, Severity};

/// Logger name embedded in every audit line.
pub const AUDIT_LOGGER_NAME: &str = "pipeline_audit";

/// Default number of events returned by a history query with no limit.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// An immutable record of one monitoring-relevant occurrence.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    HealthCheck {
        #[serde(flatten)]
        check: HealthCheckResult,
    },
    FailureDetected {
        component: Component,
        error: String,
        timestamp: DateTime<Utc>,
    },
    AlertTriggered {
        component: Component,
        severity: Severity,
        timestamp: DateTime<Utc>,
    },
    RecoveryAttempt {
        #[serde(flatten)]
        attempt: RecoveryAttempt,
    },
}

/// Log level an event is emitted at. Mirrors the line contract, not the
/// tracing level enum, because WARNING (not WARN) appears in the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    Info,
    Warning,
    Error,
}

impl AuditLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditLevel::Info => "INFO",
            AuditLevel::Warning => "WARNING",
            AuditLevel::Error => "ERROR",
        }
    }
}

impl AuditEvent {
    /// TAG field of the audit line.
    pub fn tag(&self) -> &'static str {
        match self {
            AuditEvent::HealthCheck { .. } => "HEALTH_CHECK",
            AuditEvent::FailureDetected { .. } => "FAILURE_DETECTED",
            AuditEvent::AlertTriggered { .. } => "ALERT_TRIGGERED",
            AuditEvent::RecoveryAttempt { .. } => "RECOVERY_ATTEMPT",
        }
    }

    /// When the event occurred.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            AuditEvent::HealthCheck { check } => check.timestamp,
            AuditEvent::FailureDetected { timestamp, .. }
            | AuditEvent::AlertTriggered { timestamp, .. } => *timestamp,
            AuditEvent::RecoveryAttempt { attempt } => attempt.started_at,
        }
    }

    /// LEVEL field of the audit line.
    pub fn level(&self) -> AuditLevel {
        match self {
            AuditEvent::HealthCheck { .. } => AuditLevel::Info,
            AuditEvent::FailureDetected { .. } => AuditLevel::Error,
            AuditEvent::AlertTriggered { .. } => AuditLevel::Warning,
            AuditEvent::RecoveryAttempt { attempt } => {
                if attempt.success {
                    AuditLevel::Info
                } else {
                    AuditLevel::Error
                }
            }
        }
    }

    /// Structured payload after the TAG. Records with nested detail embed
    /// JSON; transition events use key=value pairs.
    pub fn payload(&self) -> String {
        match self {
            AuditEvent::HealthCheck { check } => to_json(check),
            AuditEvent::FailureDetected {
                component, error, ..
            } => format!("component={component}, error={error}"),
            AuditEvent::AlertTriggered {
                component,
                severity,
                ..
            } => format!("component={component}, severity={severity}"),
            AuditEvent::RecoveryAttempt { attempt } => to_json(attempt),
        }
    }
}

fn to_json<T: Serialize + std::fmt::Debug>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}

/// Render the stable audit line for an event.
pub fn render_line(event: &AuditEvent) -> String {
    format!(
        "{} - {} - {} - {}: {}",
        event.timestamp().format("%Y-%m-%d %H:%M:%S,%3f"),
        AUDIT_LOGGER_NAME,
        event.level().as_str(),
        event.tag(),
        event.payload()
    )
}

/// Emits audit lines through `tracing` under the `pipeline_audit` target.
///
/// File/console sinks are a subscriber concern; the monitor only guarantees
/// the line content.
#[derive(Debug, Default, Clone)]
pub struct AuditLogger;

impl AuditLogger {
    pub fn record(&self, event: &AuditEvent) {
        let line = render_line(event);
        match event.level() {
            AuditLevel::Info => info!(target: "pipeline_audit", "{line}"),
            AuditLevel::Warning => warn!(target: "pipeline_audit", "{line}"),
            AuditLevel::Error => error!(target: "pipeline_audit", "{line}"),
        }
    }
}

/// Append-only in-memory event log.
#[derive(Debug, Default)]
pub struct AuditLog {
    events: Vec<AuditEvent>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: AuditEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The `limit` most recent events, newest first. A missing or zero
    /// limit defaults to [`DEFAULT_HISTORY_LIMIT`]; the limit is clamped to
    /// the log length.
    pub fn recent(&self, limit: Option<usize>) -> Vec<AuditEvent> {
        let limit = match limit {
            Some(n) if n > 0 => n,
            _ => DEFAULT_HISTORY_LIMIT,
        };
        let take = limit.min(self.events.len());
        self.events.iter().rev().take(take).cloned().collect()
    }
}
