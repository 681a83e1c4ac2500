//! Shared mutable monitor state.
//!
//! One [`MonitorState`] exists per monitor, behind a single `RwLock`: the
//! tick loop and the recovery orchestrator write, status/metrics/history
//! queries read a consistent snapshot. Counters are monotonic for the life
//! of the process; nothing here persists across restarts.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, VecDeque};

use crate::audit::AuditLog;
use crate::types::{
    Component, HealthCheckResult, HealthStatus, MetricsSnapshot, RecoveryStats,
};

/// Mutable per-component state, owned exclusively by the monitor.
#[derive(Debug, Clone)]
pub struct ComponentState {
    pub status: HealthStatus,
    pub last_latency_ms: Option<f64>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    pub last_checked_at: Option<DateTime<Utc>>,
    /// True while a recovery action is executing for this component.
    /// At most one recovery runs per component at any time.
    pub recovery_in_flight: bool,
}

impl Default for ComponentState {
    fn default() -> Self {
        // Unchecked components count as healthy until the first probe says
        // otherwise.
        Self {
            status: HealthStatus::Healthy,
            last_latency_ms: None,
            last_error: None,
            consecutive_failures: 0,
            last_checked_at: None,
            recovery_in_flight: false,
        }
    }
}

/// Everything the tick loop, orchestrator, and queries share.
#[derive(Debug)]
pub struct MonitorState {
    pub components: BTreeMap<Component, ComponentState>,
    /// Bounded window of recent check results (`recent_failures` source).
    pub recent_checks: VecDeque<HealthCheckResult>,
    pub audit: AuditLog,
    pub total_checks: u64,
    pub failed_checks: u64,
    pub successful_recoveries: u64,
    pub failed_recoveries: u64,
    pub last_round_at: Option<DateTime<Utc>>,
}

impl MonitorState {
    pub fn new() -> Self {
        let components = Component::ALL
            .iter()
            .map(|&c| (c, ComponentState::default()))
            .collect();
        Self {
            components,
            recent_checks: VecDeque::new(),
            audit: AuditLog::new(),
            total_checks: 0,
            failed_checks: 0,
            successful_recoveries: 0,
            failed_recoveries: 0,
            last_round_at: None,
        }
    }

    /// Mutable access to a component's state. The component set is fixed at
    /// construction, so a miss is a programming error.
    pub fn component_mut(&mut self, component: Component) -> &mut ComponentState {
        self.components.entry(component).or_default()
    }

    /// Record a check result in the bounded recent-checks window.
    pub fn push_check(&mut self, result: HealthCheckResult, window: usize) {
        if self.recent_checks.len() >= window {
            self.recent_checks.pop_front();
        }
        self.recent_checks.push_back(result);
    }

    /// Derive the metrics snapshot. Rates are computed on read so they can
    /// never go stale.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        let success_rate = if self.total_checks > 0 {
            (self.total_checks - self.failed_checks) as f64 / self.total_checks as f64 * 100.0
        } else {
            0.0
        };
        let total_attempts = self.successful_recoveries + self.failed_recoveries;
        let recovery_success_rate = if total_attempts > 0 {
            self.successful_recoveries as f64 / total_attempts as f64 * 100.0
        } else {
            0.0
        };
        MetricsSnapshot {
            total_checks: self.total_checks,
            failed_checks: self.failed_checks,
            success_rate,
            recovery_stats: RecoveryStats {
                successful_recoveries: self.successful_recoveries,
                failed_recoveries: self.failed_recoveries,
                total_attempts,
                success_rate: recovery_success_rate,
            },
        }
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new()
    }
}
