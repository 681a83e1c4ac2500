//! One health-check round: concurrent time-bounded probes, result
//! application, failure-edge detection, alert dispatch, and auto-recovery
//! scheduling.
//!
//! Probe failures and timeouts collapse to FAILED results here and never
//! propagate to the tick loop. Detection fires only on the edge into FAILED
//! so a component that stays down does not storm the alert channel.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::orchestrator::{self, Trigger};
use super::MonitorError;
use super::MonitorInner;
use crate::audit::AuditEvent;
use crate::probe::{ProbeError, ProbeHealth};
use crate::types::{Component, HealthCheckResult, HealthStatus};

/// Run the probes for every component concurrently and apply the results.
pub(super) async fn run_round(inner: &Arc<MonitorInner>) {
    let timeout = inner.config.probe_timeout();

    let probes = inner.probes.iter().map(|(&component, probe)| {
        let probe = Arc::clone(probe);
        async move {
            let started = Instant::now();
            let outcome = tokio::time::timeout(timeout, probe.check()).await;
            let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
            match outcome {
                Ok(Ok(ProbeHealth::Ok)) => HealthCheckResult {
                    component,
                    status: HealthStatus::Healthy,
                    timestamp: Utc::now(),
                    latency_ms: Some(latency_ms),
                    error: None,
                },
                Ok(Ok(ProbeHealth::Degraded { reason })) => HealthCheckResult {
                    component,
                    status: HealthStatus::Degraded,
                    timestamp: Utc::now(),
                    latency_ms: Some(latency_ms),
                    error: Some(reason),
                },
                Ok(Err(e)) => HealthCheckResult {
                    component,
                    status: HealthStatus::Failed,
                    timestamp: Utc::now(),
                    latency_ms: None,
                    error: Some(e.to_string()),
                },
                Err(_) => HealthCheckResult {
                    component,
                    status: HealthStatus::Failed,
                    timestamp: Utc::now(),
                    latency_ms: None,
                    error: Some(ProbeError::Timeout(timeout).to_string()),
                },
            }
        }
    });

    let results = futures::future::join_all(probes).await;
    apply_results(inner, &results).await;
}

/// Write one round's results into shared state, then dispatch alerts and
/// auto-recoveries outside the lock.
async fn apply_results(inner: &Arc<MonitorInner>, results: &[HealthCheckResult]) {
    let mut alerts = Vec::new();
    let mut recovery_candidates = Vec::new();

    {
        let mut state = inner.state.write().await;
        state.last_round_at = Some(Utc::now());

        for result in results {
            state.total_checks += 1;
            if result.status == HealthStatus::Failed {
                state.failed_checks += 1;
            }

            let event = AuditEvent::HealthCheck {
                check: result.clone(),
            };
            inner.audit_logger.record(&event);
            state.audit.push(event);
            state.push_check(result.clone(), inner.config.recent_checks_window);

            let failed_edge = {
                let component_state = state.component_mut(result.component);
                component_state.last_latency_ms = result.latency_ms;
                component_state.last_error = result.error.clone();
                component_state.last_checked_at = Some(result.timestamp);

                match result.status {
                    HealthStatus::Failed => {
                        component_state.consecutive_failures += 1;
                        let edge = component_state.status != HealthStatus::Failed;
                        component_state.status = HealthStatus::Failed;
                        if result.component.auto_recoverable() {
                            recovery_candidates.push(result.component);
                        }
                        edge
                    }
                    HealthStatus::Healthy => {
                        // A healthy probe is the only thing that confirms
                        // recovery; the orchestrator never flips this itself.
                        component_state.consecutive_failures = 0;
                        component_state.status = HealthStatus::Healthy;
                        false
                    }
                    HealthStatus::Degraded => {
                        component_state.status = HealthStatus::Degraded;
                        false
                    }
                    // Probes never report RECOVERING; that status is owned
                    // by the orchestrator.
                    HealthStatus::Recovering => false,
                }
            };

            if failed_edge {
                let error = result
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string());
                let detected = AuditEvent::FailureDetected {
                    component: result.component,
                    error,
                    timestamp: Utc::now(),
                };
                inner.audit_logger.record(&detected);
                state.audit.push(detected);

                let alerted = AuditEvent::AlertTriggered {
                    component: result.component,
                    severity: result.component.severity(),
                    timestamp: Utc::now(),
                };
                inner.audit_logger.record(&alerted);
                state.audit.push(alerted);

                alerts.push((result.component, result.status));
            }
        }
    }

    for (component, status) in alerts {
        dispatch_alert(inner, component, status);
    }
    for component in recovery_candidates {
        schedule_auto_recovery(inner, component).await;
    }
}

/// Fire-and-forget alert delivery. Sink failures are logged, never retried,
/// never fatal.
fn dispatch_alert(inner: &Arc<MonitorInner>, component: Component, status: HealthStatus) {
    let sink = Arc::clone(&inner.alerts);
    tokio::spawn(async move {
        if let Err(e) = sink.notify(component, status).await {
            warn!(component = %component, error = %e, "Alert delivery failed");
        }
    });
}

/// Reserve and spawn an automatic recovery for a failed component.
///
/// A recovery already in flight, or a component with no automatic action,
/// is a quiet skip here — the tick loop must keep running either way.
async fn schedule_auto_recovery(inner: &Arc<MonitorInner>, component: Component) {
    match orchestrator::try_begin_recovery(inner, component, Trigger::Auto).await {
        Ok(action) => {
            let inner = Arc::clone(inner);
            tokio::spawn(async move {
                orchestrator::execute_recovery(&inner, component, action).await;
            });
        }
        Err(MonitorError::RecoveryInProgress(_)) => {
            debug!(component = %component, "Recovery already in flight, not spawning another");
        }
        Err(MonitorError::RecoveryNotSupported(_)) => {
            debug!(component = %component, "No automatic recovery action, awaiting manual intervention");
        }
        Err(e) => {
            warn!(component = %component, error = %e, "Could not schedule auto-recovery");
        }
    }
}
