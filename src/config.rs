use serde::{Deserialize, Serialize};
use crate::error::ConfigError;

/// One year
pub const MAX_APPROVAL_WINDOW_MINUTES: i64 = 365 * 24 * 60;

/// Engine settings. Every field has a default so an empty YAML file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Expiry window of a freshly requested approval
    pub approval_window_minutes: i64,
    /// Step ceiling for one run; guards against runaway graphs
    pub max_steps_per_run: usize,
    pub redis_url: Option<String>,
    pub action_queue_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            approval_window_minutes: 120,
            max_steps_per_run: 1000,
            redis_url: None,
            action_queue_key: "dunflow:actions".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.approval_window()?;
        if self.max_steps_per_run == 0 {
            return Err(ConfigError::ZeroStepCeiling);
        }
        Ok(())
    }

    pub fn approval_window(&self) -> Result<chrono::Duration, ConfigError> {
        let minutes = self.approval_window_minutes;
        if !(1..=MAX_APPROVAL_WINDOW_MINUTES).contains(&minutes) {
            return Err(ConfigError::ApprovalWindow { got: minutes, max: MAX_APPROVAL_WINDOW_MINUTES });
        }
        chrono::TimeDelta::try_minutes(minutes)
            .ok_or(ConfigError::ApprovalWindow { got: minutes, max: MAX_APPROVAL_WINDOW_MINUTES })
    }
}
