//! Monitor configuration.
//!
//! Loaded from a TOML file, with built-in defaults matching the production
//! deployment (30-second check cadence, 5-second probe timeout).
//!
//! ## Loading Order
//!
//! 1. `SENTINEL_CONFIG` environment variable (path to TOML file)
//! 2. `sentinel.toml` in the current working directory
//! 3. Built-in defaults

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Default TOML file looked up in the working directory.
const DEFAULT_CONFIG_FILE: &str = "sentinel.toml";

/// Tunable knobs for the health-check/recovery engine and its transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between scheduled check rounds.
    pub check_interval_secs: u64,
    /// Per-probe timeout in milliseconds. A probe exceeding this is a
    /// FAILED result, never an error surfaced to the tick loop.
    pub probe_timeout_ms: u64,
    /// How many recent check results to retain for `recent_failures`.
    pub recent_checks_window: usize,
    /// How many failed checks `recent_failures` surfaces.
    pub recent_failures_limit: usize,
    /// Default event count for history queries with no explicit limit.
    pub history_default_limit: usize,
    /// HTTP listen address for the transport layer.
    pub listen_addr: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 30,
            probe_timeout_ms: 5_000,
            recent_checks_window: 100,
            recent_failures_limit: 10,
            history_default_limit: 50,
            listen_addr: "0.0.0.0:8090".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration using the documented lookup order.
    ///
    /// A missing file is normal (defaults apply); an unreadable or invalid
    /// file is a warning, not a startup failure.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("SENTINEL_CONFIG") {
            return Self::load_from(Path::new(&path));
        }
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::load_from(Path::new(DEFAULT_CONFIG_FILE));
        }
        info!("No config file found, using built-in defaults");
        Self::default()
    }

    /// Load from an explicit path, falling back to defaults on any error.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "Loaded monitor config");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read config file, using defaults");
                Self::default()
            }
        }
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}
