//! Core domain types for pipeline health monitoring.
//!
//! The monitored component set is fixed: every publishing run touches the
//! network, the validation microservice, the database, the storage backend,
//! and the message queue. Each component carries static attributes (severity
//! class, recovery action, auto-recoverability) that drive the failure
//! detector and the recovery orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A monitored dependency of the publishing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Network,
    ValidationService,
    Database,
    Storage,
    Queue,
}

/// Returned when a caller names a component that does not exist.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown component: {0} (expected one of: network, validation_service, database, storage, queue)")]
pub struct InvalidComponent(pub String);

impl Component {
    /// All monitored components, in canonical order.
    pub const ALL: [Component; 5] = [
        Component::Network,
        Component::ValidationService,
        Component::Database,
        Component::Storage,
        Component::Queue,
    ];

    /// Wire/audit name of this component.
    pub fn as_str(self) -> &'static str {
        match self {
            Component::Network => "network",
            Component::ValidationService => "validation_service",
            Component::Database => "database",
            Component::Storage => "storage",
            Component::Queue => "queue",
        }
    }

    /// Whether the orchestrator may recover this component without a human.
    ///
    /// The validation service holds in-flight editorial state, so an
    /// unattended restart is not permitted — engineering must trigger it.
    pub fn auto_recoverable(self) -> bool {
        !matches!(self, Component::ValidationService)
    }

    /// The automatic recovery action bound to this component, if any.
    ///
    /// The mapping is fixed at compile time, not configurable at runtime.
    pub fn auto_action(self) -> Option<RecoveryAction> {
        match self {
            Component::Network | Component::Database => Some(RecoveryAction::Reconnect),
            Component::Storage => Some(RecoveryAction::Failover),
            Component::Queue => Some(RecoveryAction::ClearQueue),
            Component::ValidationService => None,
        }
    }

    /// The action a manual trigger runs. Same as [`auto_action`] where one
    /// exists; the validation service gets a manually-authorized restart.
    ///
    /// [`auto_action`]: Component::auto_action
    pub fn manual_action(self) -> RecoveryAction {
        self.auto_action().unwrap_or(RecoveryAction::Restart)
    }

    /// Alert severity class for this component.
    pub fn severity(self) -> Severity {
        match self {
            Component::Network | Component::ValidationService | Component::Database => {
                Severity::Critical
            }
            Component::Storage | Component::Queue => Severity::Warning,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Component {
    type Err = InvalidComponent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "network" => Ok(Component::Network),
            "validation_service" => Ok(Component::ValidationService),
            "database" => Ok(Component::Database),
            "storage" => Ok(Component::Storage),
            "queue" => Ok(Component::Queue),
            other => Err(InvalidComponent(other.to_string())),
        }
    }
}

/// Health status of a component (or of the pipeline as a whole).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Failed,
    Recovering,
}

impl HealthStatus {
    /// Aggregation severity: FAILED > RECOVERING > DEGRADED > HEALTHY.
    ///
    /// Deliberately not `Ord` on the enum itself — declaration order is the
    /// wire order, not the severity order.
    pub fn severity_rank(self) -> u8 {
        match self {
            HealthStatus::Healthy => 0,
            HealthStatus::Degraded => 1,
            HealthStatus::Recovering => 2,
            HealthStatus::Failed => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Failed => "failed",
            HealthStatus::Recovering => "recovering",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remediation strategy bound to a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    Reconnect,
    Restart,
    Failover,
    ClearQueue,
}

impl RecoveryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RecoveryAction::Reconnect => "reconnect",
            RecoveryAction::Restart => "restart",
            RecoveryAction::Failover => "failover",
            RecoveryAction::ClearQueue => "clear_queue",
        }
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => f.write_str("CRITICAL"),
            Severity::Warning => f.write_str("WARNING"),
        }
    }
}

/// Immutable result of one probe execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub component: Component,
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub latency_ms: Option<f64>,
    pub error: Option<String>,
}

/// Immutable record of one recovery attempt, successful or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryAttempt {
    /// Unique id of the form `{component}_{n}` with a monotonic counter.
    pub attempt_id: String,
    pub component: Component,
    pub action: RecoveryAction,
    pub started_at: DateTime<Utc>,
    pub duration_ms: f64,
    pub success: bool,
    pub error_message: Option<String>,
}

/// Recovery counters plus the derived success rate.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryStats {
    pub successful_recoveries: u64,
    pub failed_recoveries: u64,
    pub total_attempts: u64,
    pub success_rate: f64,
}

/// Point-in-time metrics view. Derived on read, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_checks: u64,
    pub failed_checks: u64,
    pub success_rate: f64,
    pub recovery_stats: RecoveryStats,
}

/// Full operational snapshot for engineers and dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub overall_status: HealthStatus,
    pub components: BTreeMap<Component, HealthStatus>,
    pub last_check: Option<DateTime<Utc>>,
    pub uptime_percentage: f64,
    /// Most recent FAILED check results, newest first, bounded window.
    pub recent_failures: Vec<HealthCheckResult>,
    pub suggested_actions: Vec<String>,
    /// True iff every currently FAILED component can auto-recover.
    pub is_auto_recoverable: bool,
}

/// Editor-facing publish/no-publish signal.
#[derive(Debug, Clone, Serialize)]
pub struct EditorMessage {
    pub message: String,
    pub status: HealthStatus,
    pub can_publish: bool,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_round_trip_names() {
        for component in Component::ALL {
            let parsed: Component = component.as_str().parse().unwrap();
            assert_eq!(parsed, component);
        }
        assert!("mainframe".parse::<Component>().is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(HealthStatus::Failed.severity_rank() > HealthStatus::Recovering.severity_rank());
        assert!(HealthStatus::Recovering.severity_rank() > HealthStatus::Degraded.severity_rank());
        assert!(HealthStatus::Degraded.severity_rank() > HealthStatus::Healthy.severity_rank());
    }

    #[test]
    fn test_recovery_action_mapping() {
        assert_eq!(Component::Network.auto_action(), Some(RecoveryAction::Reconnect));
        assert_eq!(Component::Database.auto_action(), Some(RecoveryAction::Reconnect));
        assert_eq!(Component::Storage.auto_action(), Some(RecoveryAction::Failover));
        assert_eq!(Component::Queue.auto_action(), Some(RecoveryAction::ClearQueue));
        assert_eq!(Component::ValidationService.auto_action(), None);
        assert_eq!(
            Component::ValidationService.manual_action(),
            RecoveryAction::Restart
        );
    }

    #[test]
    fn test_only_validation_service_needs_humans() {
        for component in Component::ALL {
            assert_eq!(
                component.auto_recoverable(),
                component != Component::ValidationService
            );
        }
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&HealthStatus::Recovering).unwrap();
        assert_eq!(json, "\"recovering\"");
        let json = serde_json::to_string(&Component::ValidationService).unwrap();
        assert_eq!(json, "\"validation_service\"");
    }
}
