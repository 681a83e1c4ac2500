//! The pipeline monitor: health-check engine, failure detector, recovery
//! orchestrator, and the query surface the transport layer consumes.
//!
//! One [`PipelineMonitor`] is constructed explicitly at startup (no ambient
//! singletons) and handed to the HTTP layer. Internally a single
//! `RwLock<MonitorState>` serializes the tick loop, the orchestrator, and
//! all queries; the tick loop itself runs on a spawned task guarded by a
//! `CancellationToken`.

mod orchestrator;
mod round;
pub mod state;
pub mod status;

pub use state::{ComponentState, MonitorState};

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::alert::{AlertSink, LogAlert};
use crate::audit::{AuditEvent, AuditLogger};
use crate::config::MonitorConfig;
use crate::probe::{sim::simulated_probes, Probe, ProbeSet};
use crate::recovery::{sim::FlakyRecovery, RecoveryRunner};
use crate::types::{
    Component, EditorMessage, InvalidComponent, MetricsSnapshot, PipelineStatus, RecoveryAttempt,
};

/// Caller-correctable errors from manual-trigger operations.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error(transparent)]
    InvalidComponent(#[from] InvalidComponent),
    #[error("recovery already in progress for {0}")]
    RecoveryInProgress(Component),
    #[error("no automatic recovery action is defined for {0}")]
    RecoveryNotSupported(Component),
}

/// Shared internals behind the cloneable monitor handle.
pub(crate) struct MonitorInner {
    pub(crate) config: MonitorConfig,
    pub(crate) probes: ProbeSet,
    pub(crate) recovery: Arc<dyn RecoveryRunner>,
    pub(crate) alerts: Arc<dyn AlertSink>,
    pub(crate) audit_logger: AuditLogger,
    pub(crate) state: RwLock<MonitorState>,
    pub(crate) attempt_seq: AtomicU64,
}

/// Handle for the running tick loop.
struct RunHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// The monitor context object. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct PipelineMonitor {
    inner: Arc<MonitorInner>,
    run: Arc<Mutex<Option<RunHandle>>>,
}

/// Assembles a monitor from injected collaborators.
///
/// Components without an injected probe get the simulated probe set; the
/// recovery runner defaults to the simulated one and alerts default to a
/// log line. Production wiring injects real clients for all three.
pub struct MonitorBuilder {
    config: MonitorConfig,
    probes: ProbeSet,
    recovery: Option<Arc<dyn RecoveryRunner>>,
    alerts: Option<Arc<dyn AlertSink>>,
}

impl MonitorBuilder {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            probes: ProbeSet::new(),
            recovery: None,
            alerts: None,
        }
    }

    /// Inject the probe for one component.
    pub fn probe(mut self, component: Component, probe: Arc<dyn Probe>) -> Self {
        self.probes.insert(component, probe);
        self
    }

    /// Inject probes for several components at once.
    pub fn probes(mut self, probes: ProbeSet) -> Self {
        self.probes.extend(probes);
        self
    }

    pub fn recovery_runner(mut self, runner: Arc<dyn RecoveryRunner>) -> Self {
        self.recovery = Some(runner);
        self
    }

    pub fn alert_sink(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.alerts = Some(sink);
        self
    }

    pub fn build(mut self) -> PipelineMonitor {
        for (component, probe) in simulated_probes() {
            self.probes.entry(component).or_insert(probe);
        }
        PipelineMonitor {
            inner: Arc::new(MonitorInner {
                config: self.config,
                probes: self.probes,
                recovery: self.recovery.unwrap_or_else(|| Arc::new(FlakyRecovery)),
                alerts: self.alerts.unwrap_or_else(|| Arc::new(LogAlert)),
                audit_logger: AuditLogger,
                state: RwLock::new(MonitorState::new()),
                attempt_seq: AtomicU64::new(0),
            }),
            run: Arc::new(Mutex::new(None)),
        }
    }
}

impl PipelineMonitor {
    /// Builder with injectable probes, recovery runner, and alert sink.
    pub fn builder(config: MonitorConfig) -> MonitorBuilder {
        MonitorBuilder::new(config)
    }

    /// Monitor with all simulated collaborators.
    pub fn new(config: MonitorConfig) -> Self {
        MonitorBuilder::new(config).build()
    }

    /// Start the scheduled tick loop. Idempotent: a second call while the
    /// loop is running does nothing.
    pub async fn start_monitoring(&self) {
        let mut run = self.run.lock().await;
        if run.is_some() {
            return;
        }

        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let inner = Arc::clone(&self.inner);
        let interval = inner.config.check_interval();

        let task = tokio::spawn(async move {
            info!(
                interval_secs = interval.as_secs_f64(),
                "Pipeline monitoring started"
            );
            loop {
                round::run_round(&inner).await;
                tokio::select! {
                    _ = loop_cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            info!("Pipeline monitoring stopped");
        });

        *run = Some(RunHandle { cancel, task });
    }

    /// Stop scheduling new rounds and wait for the in-progress round to
    /// finish. Idempotent: stopping a stopped monitor does nothing.
    pub async fn stop_monitoring(&self) {
        let handle = self.run.lock().await.take();
        if let Some(RunHandle { cancel, task }) = handle {
            cancel.cancel();
            if let Err(e) = task.await {
                error!(error = %e, "Monitor loop task failed");
            }
        }
    }

    /// Whether the tick loop is currently scheduled.
    pub async fn is_monitoring(&self) -> bool {
        self.run.lock().await.is_some()
    }

    /// Run one check round synchronously, without disturbing the timer
    /// schedule, and return the resulting status.
    pub async fn force_check(&self) -> PipelineStatus {
        round::run_round(&self.inner).await;
        self.get_pipeline_status().await
    }

    /// Current engineer-facing snapshot, derived from live state.
    pub async fn get_pipeline_status(&self) -> PipelineStatus {
        let state = self.inner.state.read().await;
        status::pipeline_status(&state, self.inner.config.recent_failures_limit)
    }

    /// Current editor-facing message and publish signal.
    pub async fn get_editor_message(&self) -> EditorMessage {
        let state = self.inner.state.read().await;
        status::editor_message(&state, self.inner.config.recent_failures_limit)
    }

    /// Current counters and derived rates.
    pub async fn get_metrics(&self) -> MetricsSnapshot {
        let state = self.inner.state.read().await;
        state.metrics_snapshot()
    }

    /// The `limit` most recent audit events, newest first. `None` (or zero)
    /// uses the configured default limit.
    pub async fn history(&self, limit: Option<usize>) -> Vec<AuditEvent> {
        let limit = limit
            .filter(|&n| n > 0)
            .unwrap_or(self.inner.config.history_default_limit);
        let state = self.inner.state.read().await;
        state.audit.recent(Some(limit))
    }

    /// Manually trigger recovery for a component.
    ///
    /// Shares the in-flight reservation with automatic recovery, so a
    /// component already recovering yields [`MonitorError::RecoveryInProgress`]
    /// rather than a duplicate attempt. Manual triggers may run actions the
    /// automatic path refuses (RESTART for the validation service).
    pub async fn attempt_recovery(
        &self,
        component: Component,
    ) -> Result<RecoveryAttempt, MonitorError> {
        let action =
            orchestrator::try_begin_recovery(&self.inner, component, orchestrator::Trigger::Manual)
                .await?;
        Ok(orchestrator::execute_recovery(&self.inner, component, action).await)
    }

    /// Status of a single component, for transport-layer shortcuts.
    pub async fn component_status(&self, component: Component) -> crate::types::HealthStatus {
        let state = self.inner.state.read().await;
        state
            .components
            .get(&component)
            .map(|c| c.status)
            .unwrap_or(crate::types::HealthStatus::Healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::sim::ScriptedProbe;
    use crate::recovery::sim::ScriptedRecovery;
    use crate::types::HealthStatus;
    use std::time::Duration;

    fn test_config() -> MonitorConfig {
        MonitorConfig {
            check_interval_secs: 1,
            probe_timeout_ms: 200,
            ..MonitorConfig::default()
        }
    }

    /// A monitor whose probes always succeed and recoveries are instant.
    fn healthy_monitor() -> PipelineMonitor {
        let mut builder = PipelineMonitor::builder(test_config())
            .recovery_runner(Arc::new(ScriptedRecovery::succeeding()));
        for component in Component::ALL {
            builder = builder.probe(component, Arc::new(ScriptedProbe::healthy()));
        }
        builder.build()
    }

    #[tokio::test]
    async fn test_force_check_updates_counters_and_state() {
        let monitor = healthy_monitor();
        let status = monitor.force_check().await;

        assert_eq!(status.overall_status, HealthStatus::Healthy);
        assert!(status.last_check.is_some());

        let metrics = monitor.get_metrics().await;
        assert_eq!(metrics.total_checks, Component::ALL.len() as u64);
        assert_eq!(metrics.failed_checks, 0);
        assert!((metrics.success_rate - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_force_check_records_one_audit_event_per_component() {
        let monitor = healthy_monitor();
        monitor.force_check().await;

        let events = monitor.history(None).await;
        assert_eq!(events.len(), Component::ALL.len());
        assert!(events
            .iter()
            .all(|e| matches!(e, AuditEvent::HealthCheck { .. })));
    }

    #[tokio::test]
    async fn test_probe_timeout_becomes_failed_result() {
        struct StuckProbe;
        #[async_trait::async_trait]
        impl Probe for StuckProbe {
            async fn check(
                &self,
            ) -> Result<crate::probe::ProbeHealth, crate::probe::ProbeError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(crate::probe::ProbeHealth::Ok)
            }
        }

        let mut builder = PipelineMonitor::builder(test_config());
        for component in Component::ALL {
            builder = builder.probe(component, Arc::new(ScriptedProbe::healthy()));
        }
        let monitor = builder
            .probe(Component::Storage, Arc::new(StuckProbe))
            .recovery_runner(Arc::new(ScriptedRecovery::succeeding()))
            .build();

        let status = monitor.force_check().await;
        // The slow probe is bounded by its own timeout and reported FAILED;
        // the other probes are unaffected.
        assert_eq!(status.components[&Component::Storage], HealthStatus::Recovering);
        assert_eq!(status.components[&Component::Network], HealthStatus::Healthy);

        let metrics = monitor.get_metrics().await;
        assert_eq!(metrics.failed_checks, 1);
    }

    #[tokio::test]
    async fn test_manual_recovery_on_recovering_component_is_rejected() {
        let monitor = PipelineMonitor::builder(test_config())
            .probe(Component::Network, Arc::new(ScriptedProbe::healthy()))
            .recovery_runner(Arc::new(ScriptedRecovery::succeeding_after(
                Duration::from_millis(200),
            )))
            .build();

        let first = {
            let monitor = monitor.clone();
            tokio::spawn(async move { monitor.attempt_recovery(Component::Network).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = monitor.attempt_recovery(Component::Network).await;
        assert!(matches!(
            second,
            Err(MonitorError::RecoveryInProgress(Component::Network))
        ));

        let first = first.await.unwrap().unwrap();
        assert!(first.success);
    }

    #[tokio::test]
    async fn test_lifecycle_is_idempotent() {
        let monitor = healthy_monitor();
        assert!(!monitor.is_monitoring().await);

        monitor.start_monitoring().await;
        monitor.start_monitoring().await;
        assert!(monitor.is_monitoring().await);

        monitor.stop_monitoring().await;
        monitor.stop_monitoring().await;
        assert!(!monitor.is_monitoring().await);
    }

    #[tokio::test]
    async fn test_attempt_ids_are_unique_and_prefixed() {
        let monitor = PipelineMonitor::builder(test_config())
            .recovery_runner(Arc::new(ScriptedRecovery::succeeding()))
            .build();

        let a = monitor.attempt_recovery(Component::Queue).await.unwrap();
        let b = monitor.attempt_recovery(Component::Queue).await.unwrap();
        assert!(a.attempt_id.starts_with("queue_"));
        assert!(b.attempt_id.starts_with("queue_"));
        assert_ne!(a.attempt_id, b.attempt_id);
    }
}
