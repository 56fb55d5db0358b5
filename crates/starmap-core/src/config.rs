//! Tracker configuration loading.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ledger::{DEFAULT_MAX_ALERTS, DEFAULT_MAX_ALERT_AGE_MINUTES};
use crate::trigger::RangeTrigger;

/// Tracker configuration, loaded from `.starmap/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Capacity of the red (alerting) collection
    #[serde(default = "default_max_alerts")]
    pub max_alerts: usize,

    /// Minutes before an alert ages out; 0 disables age eviction
    #[serde(default = "default_max_alert_age")]
    pub max_alert_age_minutes: u32,

    /// Interval of the pathfinding pump tick
    #[serde(default = "default_path_tick_ms")]
    pub path_tick_ms: u64,

    /// Interval of the animation tick
    #[serde(default = "default_animation_tick_ms")]
    pub animation_tick_ms: u64,

    /// Home system name
    pub home_system: Option<String>,

    /// Systems excluded from route search
    pub ignore_systems: Vec<String>,

    /// Jump-range alert triggers
    pub triggers: Vec<RangeTrigger>,
}

fn default_max_alerts() -> usize {
    DEFAULT_MAX_ALERTS
}
fn default_max_alert_age() -> u32 {
    DEFAULT_MAX_ALERT_AGE_MINUTES
}
fn default_path_tick_ms() -> u64 {
    100
}
fn default_animation_tick_ms() -> u64 {
    33
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_alerts: default_max_alerts(),
            max_alert_age_minutes: default_max_alert_age(),
            path_tick_ms: default_path_tick_ms(),
            animation_tick_ms: default_animation_tick_ms(),
            home_system: None,
            ignore_systems: Vec::new(),
            triggers: Vec::new(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load from a project directory (looks for .starmap/config.yaml)
    pub fn load_from_dir(root: &Path) -> Result<Self> {
        let config_path = root.join(".starmap/config.yaml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }
}
