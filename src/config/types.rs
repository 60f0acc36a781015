use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub jellyfin: JellyfinConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// How often to check sessions, in milliseconds (default: 100)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Seek again when a session is still inside an already skipped range
    /// after this many milliseconds. Unset (the default) seeks once per range.
    #[serde(default)]
    pub reissue_after_ms: Option<u64>,
}

fn default_interval_ms() -> u64 {
    100
}

impl ScanConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn reissue_after(&self) -> Option<Duration> {
        self.reissue_after_ms.map(Duration::from_millis)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            reissue_after_ms: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JellyfinConfig {
    #[serde(default = "default_jellyfin_url")]
    pub url: String,

    /// API key with administrator rights (media paths are only reported to admins)
    #[serde(default)]
    pub api_key: String,
}

fn default_jellyfin_url() -> String {
    "http://localhost:8096".to_string()
}

impl Default for JellyfinConfig {
    fn default() -> Self {
        Self {
            url: default_jellyfin_url(),
            api_key: String::new(),
        }
    }
}
