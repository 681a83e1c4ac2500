//! Simulated recovery runners for demos and tests.

use async_trait::async_trait;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::{RecoveryError, RecoveryRunner};
use crate::types::{Component, RecoveryAction};

/// Runner that takes a realistic amount of time per action and fails at the
/// staging rates (reconnect 20%, restart 15%, clear-queue 10%, failover 25%).
pub struct FlakyRecovery;

impl FlakyRecovery {
    fn profile(action: RecoveryAction) -> (Duration, f64) {
        match action {
            RecoveryAction::Reconnect => (Duration::from_millis(300), 0.20),
            RecoveryAction::Restart => (Duration::from_millis(500), 0.15),
            RecoveryAction::ClearQueue => (Duration::from_millis(200), 0.10),
            RecoveryAction::Failover => (Duration::from_millis(400), 0.25),
        }
    }
}

#[async_trait]
impl RecoveryRunner for FlakyRecovery {
    async fn run(&self, _component: Component, action: RecoveryAction) -> Result<(), RecoveryError> {
        let (delay, failure_rate) = Self::profile(action);
        tokio::time::sleep(delay).await;
        let roll: f64 = rand::thread_rng().gen();
        if roll < failure_rate {
            Err(RecoveryError(format!("{action} failed")))
        } else {
            Ok(())
        }
    }
}

/// Runner that plays back a fixed outcome sequence, then succeeds.
///
/// `delay` is applied to every call so tests can hold a recovery in flight
/// long enough to exercise the mutual-exclusion path.
pub struct ScriptedRecovery {
    delay: Duration,
    outcomes: Mutex<VecDeque<Result<(), RecoveryError>>>,
}

impl ScriptedRecovery {
    pub fn new(
        delay: Duration,
        outcomes: impl IntoIterator<Item = Result<(), RecoveryError>>,
    ) -> Self {
        Self {
            delay,
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        }
    }

    /// A runner that always succeeds immediately.
    pub fn succeeding() -> Self {
        Self::new(Duration::ZERO, [])
    }

    /// A runner that always succeeds after the given delay.
    pub fn succeeding_after(delay: Duration) -> Self {
        Self::new(delay, [])
    }

    /// A runner whose first `n` calls fail, then succeeds.
    pub fn failing_times(n: usize, error: impl Into<String>) -> Self {
        let error = error.into();
        Self::new(
            Duration::ZERO,
            std::iter::repeat_with(|| Err(RecoveryError(error.clone()))).take(n),
        )
    }
}

#[async_trait]
impl RecoveryRunner for ScriptedRecovery {
    async fn run(&self, _component: Component, _action: RecoveryAction) -> Result<(), RecoveryError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = {
            let mut outcomes = self.outcomes.lock().unwrap_or_else(|e| e.into_inner());
            outcomes.pop_front()
        };
        next.unwrap_or(Ok(()))
    }
}
