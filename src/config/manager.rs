//! Owns the active settings.

use std::path::PathBuf;

use super::{
    CacheSettings,
    ConfigError,
    loader,
};

/// Loads, validates and hands out [`CacheSettings`].
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// Last settings that passed validation
    current_settings: CacheSettings,

    /// Directory the settings were loaded from. Relative paths resolve against it.
    root: Option<PathBuf>,
}

impl ConfigManager {
    /// Manager holding the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: CacheSettings::default(), root: None }
    }

    /// Loads settings from `root`, falling back to defaults when there is no file.
    ///
    /// # Errors
    /// - File read failure
    /// - JSON parse failure
    /// - Validation failure
    pub fn load_settings(&mut self, root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings from: {:?}", root);

        let settings = if let Some(root) = &root {
            loader::load_from_root(root)?.unwrap_or_default()
        } else {
            CacheSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.root = root;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    /// Active settings.
    #[must_use]
    pub const fn get_settings(&self) -> &CacheSettings {
        &self.current_settings
    }

    /// `langDir` resolved against the settings root.
    #[must_use]
    pub fn lang_dir(&self) -> PathBuf {
        match &self.root {
            Some(root) => root.join(&self.current_settings.lang_dir),
            None => self.current_settings.lang_dir.clone(),
        }
    }
}
