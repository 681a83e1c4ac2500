//! Probe contract for monitored components.
//!
//! Probes are pluggable collaborators: the engine owns the timer, the
//! timeout, and the latency measurement; a probe only reports whether its
//! component answered. Production deployments inject real network/database/
//! queue clients here; [`sim`] provides the simulated set used by the demo
//! binary and tests.

pub mod sim;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::types::Component;

/// What a probe observed when its component answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeHealth {
    /// Component answered normally.
    Ok,
    /// Component answered but with reduced capability.
    Degraded { reason: String },
}

/// Why a probe did not get a healthy answer.
///
/// Both variants collapse to a FAILED check result; neither propagates past
/// the health check engine.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Failure(String),
}

/// One check function per monitored component.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self) -> Result<ProbeHealth, ProbeError>;
}

/// The injected probe set, one entry per component.
pub type ProbeSet = HashMap<Component, Arc<dyn Probe>>;
