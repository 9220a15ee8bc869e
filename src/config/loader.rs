//! Reads the settings file.

use std::path::Path;

use super::{
    CacheSettings,
    ConfigError,
};

/// Name of the settings file looked up in the root directory.
pub(super) const CONFIG_FILE_NAME: &str = ".locale-cache.json";

/// Loads `.locale-cache.json` from `root`.
///
/// # Returns
/// - `Ok(Some(settings))`: file found and parsed
/// - `Ok(None)`: no settings file
/// - `Err(ConfigError)`: read or parse failure
pub(super) fn load_from_root(root: &Path) -> Result<Option<CacheSettings>, ConfigError> {
    let config_path = root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    let settings: CacheSettings = serde_json::from_str(&content)?;

    Ok(Some(settings))
}
