use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use updoot_core::engagement::SnapshotPolicy;

use crate::error::{ClientError, Result};

pub const DEFAULT_ORIGIN: &str = "https://updoot-backend-mvp.herokuapp.com";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub backend: BackendConfig,
    pub engagement: EngagementConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub origin: String,
    pub prefix: String,
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            prefix: "/api".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl BackendConfig {
    pub fn base_url(&self) -> String {
        format!("{}{}", self.origin.trim_end_matches('/'), self.prefix)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngagementConfig {
    pub delay_ms: u64,
    pub snapshot_policy: SnapshotPolicy,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            snapshot_policy: SnapshotPolicy::Overwrite,
        }
    }
}

impl EngagementConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ClientError::Config(e.to_string()))
    }
}
