//! Alert delivery capability.
//!
//! The failure detector calls [`AlertSink::notify`] exactly once per
//! transition into FAILED, on a spawned task. Delivery failures are logged
//! and dropped — alerting must never abort a check cycle.

use async_trait::async_trait;
use tracing::warn;

use crate::types::{Component, HealthStatus};

/// Capability interface for outbound alerts (pager, chat webhook, ...).
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn notify(&self, component: Component, status: HealthStatus) -> anyhow::Result<()>;
}

/// Default sink: a structured log line, nothing external.
pub struct LogAlert;

#[async_trait]
impl AlertSink for LogAlert {
    async fn notify(&self, component: Component, status: HealthStatus) -> anyhow::Result<()> {
        warn!(
            component = %component,
            status = %status,
            severity = %component.severity(),
            "ALERT: component failure"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_alert_never_errors() {
        let sink = LogAlert;
        assert!(sink
            .notify(Component::Database, HealthStatus::Failed)
            .await
            .is_ok());
    }
}
