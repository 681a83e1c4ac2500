//! Simulated probes for demos and tests.
//!
//! `FlakyProbe` reproduces the failure rates and latencies of the staging
//! harness; `ScriptedProbe` plays back a fixed outcome sequence so tests can
//! force exact failure/recovery timelines.

use async_trait::async_trait;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use super::{Probe, ProbeError, ProbeHealth, ProbeSet};
use crate::types::Component;

/// Probe that fails randomly at a configured rate.
pub struct FlakyProbe {
    latency: Duration,
    failure_rate: f64,
    error: String,
}

impl FlakyProbe {
    pub fn new(latency: Duration, failure_rate: f64, error: impl Into<String>) -> Self {
        Self {
            latency,
            failure_rate,
            error: error.into(),
        }
    }
}

#[async_trait]
impl Probe for FlakyProbe {
    async fn check(&self) -> Result<ProbeHealth, ProbeError> {
        tokio::time::sleep(self.latency).await;
        let roll: f64 = rand::thread_rng().gen();
        if roll < self.failure_rate {
            Err(ProbeError::Failure(self.error.clone()))
        } else {
            Ok(ProbeHealth::Ok)
        }
    }
}

/// One scripted probe outcome.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    Healthy,
    Degraded(String),
    Fail(String),
}

impl ScriptedOutcome {
    fn into_result(self) -> Result<ProbeHealth, ProbeError> {
        match self {
            ScriptedOutcome::Healthy => Ok(ProbeHealth::Ok),
            ScriptedOutcome::Degraded(reason) => Ok(ProbeHealth::Degraded { reason }),
            ScriptedOutcome::Fail(error) => Err(ProbeError::Failure(error)),
        }
    }
}

/// Probe that plays back a fixed sequence of outcomes, then reports healthy.
pub struct ScriptedProbe {
    outcomes: Mutex<VecDeque<ScriptedOutcome>>,
}

impl ScriptedProbe {
    pub fn new(outcomes: impl IntoIterator<Item = ScriptedOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        }
    }

    /// A probe that always reports healthy.
    pub fn healthy() -> Self {
        Self::new([])
    }

    /// A probe that fails `n` times with the given error, then recovers.
    pub fn failing_times(n: usize, error: impl Into<String>) -> Self {
        let error = error.into();
        Self::new(std::iter::repeat_with(|| ScriptedOutcome::Fail(error.clone())).take(n))
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn check(&self) -> Result<ProbeHealth, ProbeError> {
        let next = {
            let mut outcomes = self.outcomes.lock().unwrap_or_else(|e| e.into_inner());
            outcomes.pop_front()
        };
        match next {
            Some(outcome) => outcome.into_result(),
            None => Ok(ProbeHealth::Ok),
        }
    }
}

/// The full simulated probe set with staging failure rates and latencies.
pub fn simulated_probes() -> ProbeSet {
    let mut probes = ProbeSet::new();
    probes.insert(
        Component::Network,
        Arc::new(FlakyProbe::new(
            Duration::from_millis(50),
            0.05,
            "Network timeout",
        )) as Arc<dyn Probe>,
    );
    probes.insert(
        Component::ValidationService,
        Arc::new(FlakyProbe::new(
            Duration::from_millis(30),
            0.03,
            "Validation service unresponsive",
        )),
    );
    probes.insert(
        Component::Database,
        Arc::new(FlakyProbe::new(
            Duration::from_millis(20),
            0.02,
            "Database connection lost",
        )),
    );
    probes.insert(
        Component::Storage,
        Arc::new(FlakyProbe::new(
            Duration::from_millis(40),
            0.01,
            "Storage service unavailable",
        )),
    );
    probes.insert(
        Component::Queue,
        Arc::new(FlakyProbe::new(
            Duration::from_millis(20),
            0.04,
            "Queue broker connection failed",
        )),
    );
    probes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_probe_plays_sequence_then_healthy() {
        let probe = ScriptedProbe::new([
            ScriptedOutcome::Fail("boom".to_string()),
            ScriptedOutcome::Degraded("slow".to_string()),
        ]);

        assert!(probe.check().await.is_err());
        assert!(matches!(
            probe.check().await,
            Ok(ProbeHealth::Degraded { .. })
        ));
        assert_eq!(probe.check().await.unwrap(), ProbeHealth::Ok);
        assert_eq!(probe.check().await.unwrap(), ProbeHealth::Ok);
    }

    #[tokio::test]
    async fn test_flaky_probe_at_rate_zero_never_fails() {
        let probe = FlakyProbe::new(Duration::from_millis(1), 0.0, "never");
        for _ in 0..10 {
            assert!(probe.check().await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_flaky_probe_at_rate_one_always_fails() {
        let probe = FlakyProbe::new(Duration::from_millis(1), 1.0, "always");
        assert!(probe.check().await.is_err());
    }

    #[test]
    fn test_simulated_set_covers_all_components() {
        let probes = simulated_probes();
        for component in Component::ALL {
            assert!(probes.contains_key(&component));
        }
    }
}
