//! Recovery orchestration.
//!
//! Per-component state machine: FAILED → RECOVERING (reserved here, at most
//! one in flight per component) → HEALTHY only once a later probe confirms
//! it, or back to FAILED when the action fails. The runner's own success
//! flag never flips a component healthy by itself.

use chrono::Utc;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use super::{MonitorError, MonitorInner};
use crate::audit::AuditEvent;
use crate::types::{Component, HealthStatus, RecoveryAction, RecoveryAttempt};

/// Who asked for the recovery. Determines which action applies: the
/// automatic path refuses components with no defined automatic action,
/// the manual path may run actions an operator has authorized (RESTART
/// for the validation service).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Trigger {
    Auto,
    Manual,
}

/// Atomically reserve the recovery slot for a component.
///
/// On success the component is marked RECOVERING with `recovery_in_flight`
/// set, and the caller must follow up with [`execute_recovery`]. This is
/// the single mutual-exclusion point shared by the tick loop and manual
/// triggers.
pub(super) async fn try_begin_recovery(
    inner: &Arc<MonitorInner>,
    component: Component,
    trigger: Trigger,
) -> Result<RecoveryAction, MonitorError> {
    let action = match trigger {
        Trigger::Auto => component
            .auto_action()
            .ok_or(MonitorError::RecoveryNotSupported(component))?,
        Trigger::Manual => component.manual_action(),
    };

    let mut state = inner.state.write().await;
    let component_state = state.component_mut(component);
    if component_state.recovery_in_flight {
        return Err(MonitorError::RecoveryInProgress(component));
    }
    component_state.recovery_in_flight = true;
    component_state.status = HealthStatus::Recovering;
    Ok(action)
}

/// Run a reserved recovery action to completion and record the attempt.
///
/// The attempt is recorded (state counters, audit event, audit line)
/// regardless of outcome; runner errors are captured, never propagated.
pub(super) async fn execute_recovery(
    inner: &Arc<MonitorInner>,
    component: Component,
    action: RecoveryAction,
) -> RecoveryAttempt {
    let seq = inner.attempt_seq.fetch_add(1, Ordering::Relaxed) + 1;
    let attempt_id = format!("{component}_{seq}");
    let started_at = Utc::now();
    let started = Instant::now();

    let outcome = inner.recovery.run(component, action).await;
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

    let attempt = RecoveryAttempt {
        attempt_id,
        component,
        action,
        started_at,
        duration_ms,
        success: outcome.is_ok(),
        error_message: outcome.err().map(|e| e.to_string()),
    };

    let mut state = inner.state.write().await;
    if attempt.success {
        state.successful_recoveries += 1;
    } else {
        state.failed_recoveries += 1;
    }
    {
        let component_state = state.component_mut(component);
        // Two concurrent recoveries for one component would be a bookkeeping
        // bug, not an operational condition.
        assert!(
            component_state.recovery_in_flight,
            "recovery completed for {component} without an in-flight reservation"
        );
        component_state.recovery_in_flight = false;
        if !attempt.success {
            // Back to FAILED; eligible for another attempt next cycle or on
            // manual trigger.
            component_state.status = HealthStatus::Failed;
            component_state.last_error = attempt.error_message.clone();
        }
        // On success the status stays RECOVERING until the next probe
        // confirms the component is actually back.
    }

    let event = AuditEvent::RecoveryAttempt {
        attempt: attempt.clone(),
    };
    inner.audit_logger.record(&event);
    state.audit.push(event);

    attempt
}
