//! Status synthesis: pure derivations from live monitor state.
//!
//! Nothing here is cached — every call recomputes from the current
//! [`MonitorState`] so the snapshot can never drift from reality.

use chrono::Utc;

use super::state::MonitorState;
use crate::types::{
    Component, EditorMessage, HealthCheckResult, HealthStatus, PipelineStatus,
};

/// Fixed remediation text per component, shown while it is not healthy.
fn remediation_text(component: Component) -> &'static str {
    match component {
        Component::Network => {
            "Network is down. Check internet connectivity and firewall rules."
        }
        Component::ValidationService => {
            "Validation service crashed. Contact engineering to restart service."
        }
        Component::Database => {
            "Database connection lost. Check DB server status and credentials."
        }
        Component::Storage => {
            "Storage unavailable. Verify storage service and check disk space."
        }
        Component::Queue => {
            "Message queue down. Check queue broker and clear stuck messages."
        }
    }
}

/// Text shown when every component is healthy.
const ALL_OPERATIONAL: &str = "All systems operational. No action needed.";

/// Maximum-severity status across all components.
pub fn overall_status(state: &MonitorState) -> HealthStatus {
    state
        .components
        .values()
        .map(|c| c.status)
        .max_by_key(|s| s.severity_rank())
        .unwrap_or(HealthStatus::Healthy)
}

/// Cumulative uptime over the full run; 100% before the first check.
pub fn uptime_percentage(state: &MonitorState) -> f64 {
    if state.total_checks == 0 {
        100.0
    } else {
        (state.total_checks - state.failed_checks) as f64 / state.total_checks as f64 * 100.0
    }
}

/// Most recent FAILED check results, newest first.
pub fn recent_failures(state: &MonitorState, limit: usize) -> Vec<HealthCheckResult> {
    state
        .recent_checks
        .iter()
        .rev()
        .filter(|c| c.status == HealthStatus::Failed)
        .take(limit)
        .cloned()
        .collect()
}

/// One remediation line per non-healthy component, or the all-clear line.
pub fn suggested_actions(state: &MonitorState) -> Vec<String> {
    let actions: Vec<String> = state
        .components
        .iter()
        .filter(|(_, c)| c.status != HealthStatus::Healthy)
        .map(|(&component, _)| remediation_text(component).to_string())
        .collect();
    if actions.is_empty() {
        vec![ALL_OPERATIONAL.to_string()]
    } else {
        actions
    }
}

/// True iff no currently FAILED component requires manual intervention.
/// Vacuously true when nothing has failed.
pub fn is_auto_recoverable(state: &MonitorState) -> bool {
    state
        .components
        .iter()
        .filter(|(_, c)| c.status == HealthStatus::Failed)
        .all(|(&component, _)| component.auto_recoverable())
}

/// Editors may publish unless a component that cannot self-recover is down.
pub fn can_publish(state: &MonitorState) -> bool {
    is_auto_recoverable(state)
}

/// Assemble the full engineer-facing snapshot.
pub fn pipeline_status(state: &MonitorState, recent_failures_limit: usize) -> PipelineStatus {
    PipelineStatus {
        overall_status: overall_status(state),
        components: state
            .components
            .iter()
            .map(|(&component, c)| (component, c.status))
            .collect(),
        last_check: state.last_round_at,
        uptime_percentage: uptime_percentage(state),
        recent_failures: recent_failures(state, recent_failures_limit),
        suggested_actions: suggested_actions(state),
        is_auto_recoverable: is_auto_recoverable(state),
    }
}

/// Assemble the editor-facing message for the current state.
pub fn editor_message(state: &MonitorState, recent_failures_limit: usize) -> EditorMessage {
    let status = pipeline_status(state, recent_failures_limit);
    let message = render_editor_message(&status, can_publish(state));
    EditorMessage {
        message,
        status: status.overall_status,
        can_publish: can_publish(state),
        timestamp: Utc::now(),
    }
}

/// Templated editor message keyed by overall status.
fn render_editor_message(status: &PipelineStatus, can_publish: bool) -> String {
    match status.overall_status {
        HealthStatus::Healthy => {
            let last_check = status
                .last_check
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "never".to_string());
            format!(
                "Publishing Pipeline: OPERATIONAL\n\
                 \n\
                 All systems are running normally. You can publish articles without issues.\n\
                 \n\
                 Uptime: {:.2}%\n\
                 Last Check: {last_check}",
                status.uptime_percentage
            )
        }
        HealthStatus::Degraded | HealthStatus::Recovering => {
            format!(
                "Publishing Pipeline: RECOVERING\n\
                 \n\
                 The system detected issues and is attempting automatic recovery.\n\
                 Please wait 1-2 minutes before trying to publish.\n\
                 \n\
                 {}\n\
                 \n\
                 If the issue persists, contact engineering.",
                status.suggested_actions.join("\n")
            )
        }
        HealthStatus::Failed => {
            let issues: Vec<String> = status
                .components
                .iter()
                .filter(|(_, &s)| s != HealthStatus::Healthy)
                .map(|(c, s)| format!("- {c}: {s}"))
                .collect();
            let next_steps = if can_publish {
                "Automatic recovery in progress."
            } else {
                "Manual intervention required - contact engineering immediately."
            };
            let failures: Vec<String> = status
                .recent_failures
                .iter()
                .take(3)
                .map(|f| {
                    format!(
                        "- {}: {}",
                        f.component,
                        f.error.as_deref().unwrap_or("unknown error")
                    )
                })
                .collect();
            format!(
                "Publishing Pipeline: DOWN\n\
                 \n\
                 The publishing system is currently unavailable.\n\
                 \n\
                 Issues Detected:\n{}\n\
                 \n\
                 Next Steps:\n{}\n\
                 \n\
                 Recent Failures:\n{}\n\
                 \n\
                 For immediate assistance, contact the engineering team with this error report.",
                issues.join("\n"),
                next_steps,
                failures.join("\n")
            )
        }
    }
}
