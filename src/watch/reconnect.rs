use crate::error::{Result, TaskboardError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff for re-establishing the change stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    /// Delay before the first retry
    pub base_delay_ms: u64,
    /// Growth factor applied per retry
    pub multiplier: f64,
    /// Retries allowed before giving up
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            multiplier: 1.5,
            max_attempts: 10,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (1-based), or `None` once the
    /// attempts are used up.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let factor = self.multiplier.powi(exponent);
        let millis = (self.base_delay_ms as f64 * factor).round() as u64;
        Some(Duration::from_millis(millis))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(TaskboardError::InvalidConfig {
                field: "watch.reconnect.multiplier".to_string(),
                message: format!("must be at least 1.0, got {}", self.multiplier),
            });
        }
        if self.max_attempts == 0 {
            return Err(TaskboardError::InvalidConfig {
                field: "watch.reconnect.max_attempts".to_string(),
                message: "must allow at least one attempt".to_string(),
            });
        }
        Ok(())
    }
}
