use std::path::PathBuf;
use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::cache::DEFAULT_IDLE_TIMEOUT;

/// One rejected setting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "idleTimeoutSecs")
    pub field_path: String,
    /// What is wrong with it
    pub message: String,
}

impl ValidationError {
    /// Error for the setting at `field_path`.
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

/// Settings could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Every setting that failed validation
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    /// The file exists but could not be read
    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not valid settings JSON
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Numbered list, one error per line.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Contents of `.locale-cache.json`. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheSettings {
    /// Directory holding one `<code>.json` per locale.
    /// Relative paths are resolved against the directory the settings came from.
    pub lang_dir: PathBuf,

    /// Seconds without a lookup before a table is dropped.
    pub idle_timeout_secs: u64,

    /// Seconds between background sweeps for idle tables.
    pub sweep_interval_secs: u64,

    /// Log every load and eviction at startup. Can be toggled at runtime.
    pub verbose: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            lang_dir: PathBuf::from("lang"),
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT.as_secs(),
            sweep_interval_secs: 30,
            verbose: true,
        }
    }
}

impl CacheSettings {
    /// `idleTimeoutSecs` as a duration.
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// `sweepIntervalSecs` as a duration.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// # Errors
    /// - Empty `langDir`
    /// - Zero timeout or sweep interval
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.lang_dir.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "langDir",
                "The directory cannot be empty. Example: \"lang\"",
            ));
        }

        if self.idle_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "idleTimeoutSecs",
                "Must be at least 1 second. Tables would expire as soon as they load",
            ));
        }

        if self.sweep_interval_secs == 0 {
            errors.push(ValidationError::new("sweepIntervalSecs", "Must be at least 1 second"));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    fn validate_valid_settings() {
        let settings = CacheSettings::default();

        assert_that!(settings.validate(), ok(anything()));
    }

    #[rstest]
    fn deserialize_partial_settings() {
        let json = r#"{"idleTimeoutSecs": 5}"#;

        let settings: CacheSettings = serde_json::from_str(json).unwrap();

        assert_that!(settings.idle_timeout(), eq(Duration::from_secs(5)));
        assert_that!(settings.sweep_interval_secs, eq(30));
        assert_that!(settings.verbose, eq(true));
    }

    #[rstest]
    fn deserialize_empty_settings() {
        let settings: CacheSettings = serde_json::from_str("{}").unwrap();

        assert_that!(settings, eq(&CacheSettings::default()));
        assert_that!(settings.idle_timeout(), eq(Duration::from_secs(120)));
    }

    #[rstest]
    fn validate_zero_idle_timeout() {
        let settings = CacheSettings { idle_timeout_secs: 0, ..CacheSettings::default() };
        let result = settings.validate();

        assert_that!(
            result,
            err(elements_are![all![
                field!(ValidationError.field_path, eq("idleTimeoutSecs")),
                field!(ValidationError.message, contains_substring("at least 1 second"))
            ]])
        );
    }

    #[rstest]
    fn validate_empty_lang_dir() {
        let settings = CacheSettings { lang_dir: PathBuf::new(), ..CacheSettings::default() };
        let result = settings.validate();

        assert_that!(
            result,
            err(elements_are![all![
                field!(ValidationError.field_path, eq("langDir")),
                field!(ValidationError.message, contains_substring("cannot be empty"))
            ]])
        );
    }

    #[rstest]
    fn config_error_validation_errors_format() {
        let settings = CacheSettings {
            idle_timeout_secs: 0,
            sweep_interval_secs: 0,
            ..CacheSettings::default()
        };

        let errors = settings.validate().unwrap_err();
        let config_error = ConfigError::ValidationErrors(errors);

        let error_message = format!("{config_error}");
        assert_that!(error_message, contains_substring("Configuration validation failed"));
        assert_that!(error_message, contains_substring("1. idleTimeoutSecs"));
        assert_that!(error_message, contains_substring("2. sweepIntervalSecs"));
    }
}
