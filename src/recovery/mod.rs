//! Recovery runner contract.
//!
//! The orchestrator decides *when* to recover and *which* action applies
//! (see [`Component::auto_action`]); the runner is the pluggable collaborator
//! that actually reconnects, restarts, fails over, or clears the queue.
//! Runner failures are captured in the [`RecoveryAttempt`] record and never
//! propagate past the orchestrator.
//!
//! [`Component::auto_action`]: crate::types::Component::auto_action
//! [`RecoveryAttempt`]: crate::types::RecoveryAttempt

pub mod sim;

use async_trait::async_trait;

use crate::types::{Component, RecoveryAction};

/// A recovery action failed. The message ends up in the attempt record.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct RecoveryError(pub String);

/// Executes recovery actions against the real infrastructure.
#[async_trait]
pub trait RecoveryRunner: Send + Sync {
    async fn run(&self, component: Component, action: RecoveryAction) -> Result<(), RecoveryError>;
}
