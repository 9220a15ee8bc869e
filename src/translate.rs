//! Translate-by-key on top of the cache.

use crate::cache::LocaleCache;
use crate::error::{
    LoadError,
    TranslateError,
};
use crate::keys::{
    self,
    PotionSort,
};
use crate::locale::Locale;

/// Shown for the `custom` biome, which has no dictionary entry.
const CUSTOM_BIOME: &str = "Custom";

/// Looks up translations, loading locales through the cache on demand.
#[derive(Debug, Clone)]
pub struct Translator {
    /// Source of translation tables
    cache: LocaleCache,
}

impl Translator {
    /// Facade over `cache`.
    #[must_use]
    pub const fn new(cache: LocaleCache) -> Self {
        Self { cache }
    }

    /// The cache lookups go through.
    #[must_use]
    pub const fn cache(&self) -> &LocaleCache {
        &self.cache
    }

    /// Translation of `key` (case-insensitive) in `locale`.
    ///
    /// # Errors
    /// - [`TranslateError::Load`] if the locale cannot be loaded
    /// - [`TranslateError::KeyNotFound`] if the table has no such key
    pub async fn translate(&self, locale: Locale, key: &str) -> Result<String, TranslateError> {
        let table = self.cache.get_or_load(locale).await?;
        table.get(key).map(str::to_string).ok_or_else(|| TranslateError::KeyNotFound {
            locale,
            key: key.to_lowercase(),
        })
    }

    /// Every key the locale defines, sorted.
    pub async fn keys(&self, locale: Locale) -> Result<Vec<String>, LoadError> {
        let table = self.cache.get_or_load(locale).await?;
        Ok(table.keys().into_iter().map(str::to_string).collect())
    }

    /// Biome name, or `"Custom"` for custom biomes, which have no entry.
    pub async fn biome(&self, locale: Locale, name: &str) -> Result<String, TranslateError> {
        match keys::biome(name) {
            Some(key) => self.translate(locale, &key).await,
            None => Ok(CUSTOM_BIOME.to_string()),
        }
    }

    /// Block or item name. Wall variants share the name of the standing block.
    pub async fn material(
        &self,
        locale: Locale,
        name: &str,
        is_block: bool,
    ) -> Result<String, TranslateError> {
        self.translate(locale, &keys::material(name, is_block)).await
    }

    /// Potion name for the given bottle.
    pub async fn potion(
        &self,
        locale: Locale,
        name: &str,
        sort: PotionSort,
    ) -> Result<String, TranslateError> {
        self.translate(locale, &keys::potion(name, sort)).await
    }

    /// Effect name; `None` gives the "no effect" text.
    pub async fn effect(&self, locale: Locale, name: Option<&str>) -> Result<String, TranslateError> {
        self.translate(locale, &keys::effect(name)).await
    }

    /// Enchantment name.
    pub async fn enchantment(&self, locale: Locale, name: &str) -> Result<String, TranslateError> {
        self.translate(locale, &keys::enchantment(name)).await
    }

    /// Entity name; `None` gives the "unknown entity" text.
    pub async fn entity(&self, locale: Locale, name: Option<&str>) -> Result<String, TranslateError> {
        self.translate(locale, &keys::entity(name)).await
    }

    /// Villager profession name.
    pub async fn villager(&self, locale: Locale, profession: &str) -> Result<String, TranslateError> {
        self.translate(locale, &keys::villager_profession(profession)).await
    }

    /// Legacy villager career name (`FLETCHER_ARROW`).
    pub async fn villager_career(&self, locale: Locale, career: &str) -> Result<String, TranslateError> {
        self.translate(locale, &keys::villager_career(career)).await
    }

    /// Tropical fish pattern name.
    pub async fn tropical_fish(&self, locale: Locale, pattern: &str) -> Result<String, TranslateError> {
        self.translate(locale, &keys::tropical_fish(pattern)).await
    }
}
