//! Project settings read from `.taskboard/config.toml`.
//!
//! Every section and field is optional; missing values fall back to their
//! defaults.
//!
//! ```toml
//! [order]
//! gap = 10000.0
//! bisection = "fractional"
//! tail_spacing = 1.0
//!
//! [watch]
//! debounce_ms = 200
//!
//! [watch.reconnect]
//! base_delay_ms = 1000
//! multiplier = 1.5
//! max_attempts = 10
//! ```

use crate::domain::order::OrderConfig;
use crate::error::{Result, TaskboardError};
use crate::watch::ReconnectPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Complete contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Order spacing for new and moved tasks
    #[serde(default)]
    pub order: OrderConfig,
    /// File-change notification client
    #[serde(default)]
    pub watch: WatchSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    /// Quiet period before a burst of changes is reported
    pub debounce_ms: u64,
    pub reconnect: ReconnectPolicy,
}

impl WatchSettings {
    pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: Self::DEFAULT_DEBOUNCE_MS,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            TaskboardError::ConfigError(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&content)
    }

    /// Parse and validate settings from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load `config.toml` from `data_dir`, or defaults if it doesn't exist
    pub async fn load_or_default(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("config.toml");
        if path.exists() {
            Self::load(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to a TOML file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.order.validate()?;
        self.watch.reconnect.validate()
    }
}
