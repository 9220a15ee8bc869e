//! Errors surfaced by loading and translating.

use std::path::PathBuf;

use thiserror::Error;

use crate::locale::Locale;

/// Failure to produce a translation table for a locale.
///
/// `Clone` because a single in-flight load hands the same outcome to every
/// caller waiting on it. Never cached: the next request retries the load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// No backing resource exists for the locale.
    #[error("Translation file for '{locale}' not found: {}", path.display())]
    ResourceNotFound { locale: Locale, path: PathBuf },

    /// The resource exists but is not a flat string-to-string document.
    #[error("Failed to parse translations for '{locale}': {message}")]
    Parse { locale: Locale, message: String },

    /// Reading failed for another reason, or the load task died.
    #[error("Translations for '{locale}' are unavailable: {reason}")]
    Unavailable { locale: Locale, reason: String },
}

impl LoadError {
    /// Locale whose load failed.
    #[must_use]
    pub const fn locale(&self) -> Locale {
        match self {
            Self::ResourceNotFound { locale, .. }
            | Self::Parse { locale, .. }
            | Self::Unavailable { locale, .. } => *locale,
        }
    }
}

/// Failure of a single lookup through [`crate::Translator`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// The locale's table could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The table loaded fine but has no such key. Callers pick their own fallback.
    #[error("No translation for key '{key}' in '{locale}'")]
    KeyNotFound { locale: Locale, key: String },
}

impl TranslateError {
    /// `true` for a plain miss as opposed to a load failure.
    #[must_use]
    pub const fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }
}
