use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use menu_gate::FeatureKey;

use crate::error::{MenuError, MenuResult};

/// Service configuration, usually loaded from `menu-ledger.toml`.
///
/// Every key is optional; missing keys take the defaults below.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Upper bound for history page sizes.
    pub history_max_limit: usize,
    /// Version-conflict retries after the first publish attempt.
    pub publish_max_retries: u32,
    /// Feature the gate must allow before a publish.
    pub publish_feature: String,
    pub sweep: SweepConfig,
    pub notifications: NotificationConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub interval_secs: u64,
    /// Most recent snapshots re-verified per run.
    pub batch_size: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Broadcast buffer; slow subscribers beyond this lag and skip.
    pub capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            history_max_limit: 100,
            publish_max_retries: 3,
            publish_feature: "menu_publish".into(),
            sweep: SweepConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            batch_size: 50,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

impl LedgerConfig {
    pub fn from_toml_str(text: &str) -> MenuResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| MenuError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> MenuResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MenuError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> MenuResult<()> {
        if self.history_max_limit == 0 {
            return Err(MenuError::Config("history_max_limit must be at least 1".into()));
        }
        if self.notifications.capacity == 0 {
            return Err(MenuError::Config(
                "notifications.capacity must be at least 1".into(),
            ));
        }
        if self.sweep.interval_secs == 0 {
            return Err(MenuError::Config("sweep.interval_secs must be at least 1".into()));
        }
        self.publish_feature_key()?;
        Ok(())
    }

    pub fn publish_feature_key(&self) -> MenuResult<FeatureKey> {
        FeatureKey::new(self.publish_feature.clone())
            .map_err(|e| MenuError::Config(format!("publish_feature: {e}")))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep.interval_secs)
    }
}
