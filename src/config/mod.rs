mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./edlskip.toml",
        "~/.config/edlskip/config.toml",
        "/etc/edlskip/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.scan.interval_ms == 0 {
        anyhow::bail!("Scan interval cannot be 0");
    }

    if config.scan.reissue_after_ms == Some(0) {
        anyhow::bail!("Re-issue delay cannot be 0, leave it unset to seek once per range");
    }

    if config.jellyfin.url.trim().is_empty() {
        anyhow::bail!("Jellyfin URL cannot be empty");
    }

    Ok(())
}

/// Checks that only matter when actually connecting to a server
pub fn require_jellyfin(config: &JellyfinConfig) -> Result<()> {
    if config.api_key.is_empty() {
        anyhow::bail!("Jellyfin API key is not configured");
    }

    Ok(())
}
