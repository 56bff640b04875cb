//! Configuration file loading

use anyhow::Context;
use goaltrack_sync::SyncConfig;
use std::path::Path;

/// Load client configuration from a TOML file, or defaults when no path is given
pub(crate) fn load(path: Option<&Path>) -> anyhow::Result<SyncConfig> {
    let Some(path) = path else {
        return Ok(SyncConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: SyncConfig = toml::from_str(&raw)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?config, "configuration loaded");
    Ok(config)
}
