//! Translation tables and the loaders that produce them.

use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{
    Path,
    PathBuf,
};

use crate::error::LoadError;
use crate::locale::Locale;

/// UTF-8 byte order mark some editors prepend to JSON files.
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Immutable key to string mapping for one locale.
///
/// Keys are stored lowercase; lookups lowercase the requested key.
#[derive(Clone, PartialEq, Eq)]
pub struct TranslationTable {
    /// Locale the table was loaded for
    locale: Locale,
    /// Lowercase key to translated string
    entries: HashMap<String, String>,
}

impl TranslationTable {
    /// Builds a table, lowercasing every key. On collisions the later entry wins.
    pub fn new<I, K, V>(locale: Locale, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries =
            entries.into_iter().map(|(k, v)| (k.as_ref().to_lowercase(), v.into())).collect();
        Self { locale, entries }
    }

    /// Locale the table belongs to.
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Looks up `key` case-insensitively.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_lowercase()).map(String::as_str)
    }

    /// All keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The table has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for TranslationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationTable")
            .field("locale", &self.locale)
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Produces the translation table for a locale.
///
/// Implementations may block on I/O; the cache runs them off the async executor
/// and never calls `load` twice concurrently for the same locale.
pub trait LocaleLoader: Send + Sync + 'static {
    /// # Errors
    /// - [`LoadError::ResourceNotFound`] when there is no data for `locale`
    /// - [`LoadError::Parse`] when the data is malformed
    /// - [`LoadError::Unavailable`] for anything else
    fn load(&self, locale: Locale) -> Result<TranslationTable, LoadError>;
}

/// Reads `<dir>/<code>.json`, a flat JSON object of string values.
#[derive(Debug, Clone)]
pub struct JsonDirLoader {
    /// Directory holding one file per locale
    dir: PathBuf,
}

impl JsonDirLoader {
    /// Loader for the files in `dir`. The directory is not checked until a load.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the files are read from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `locale`.
    #[must_use]
    pub fn path_for(&self, locale: Locale) -> PathBuf {
        self.dir.join(format!("{}.json", locale.code()))
    }
}

impl LocaleLoader for JsonDirLoader {
    fn load(&self, locale: Locale) -> Result<TranslationTable, LoadError> {
        let path = self.path_for(locale);
        tracing::debug!(locale = %locale, path = %path.display(), "Reading translation file");

        let bytes = std::fs::read(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => LoadError::ResourceNotFound { locale, path: path.clone() },
            _ => LoadError::Unavailable { locale, reason: err.to_string() },
        })?;
        let bytes = bytes.strip_prefix(BOM).unwrap_or(&bytes);

        let entries: HashMap<String, String> = serde_json::from_slice(bytes)
            .map_err(|err| LoadError::Parse { locale, message: err.to_string() })?;

        Ok(TranslationTable::new(locale, entries))
    }
}

/// Serves tables from memory. Locales without data report `ResourceNotFound`.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    /// Prebuilt tables by locale
    tables: HashMap<Locale, TranslationTable>,
}

impl StaticLoader {
    /// Loader with no data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the data for `locale`.
    #[must_use]
    pub fn with<I, K, V>(mut self, locale: Locale, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.tables.insert(locale, TranslationTable::new(locale, entries));
        self
    }
}

impl LocaleLoader for StaticLoader {
    fn load(&self, locale: Locale) -> Result<TranslationTable, LoadError> {
        self.tables
            .get(&locale)
            .cloned()
            .ok_or_else(|| LoadError::ResourceNotFound { locale, path: PathBuf::from(locale.code()) })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn write_lang(dir: &TempDir, locale: Locale, content: &[u8]) {
        fs::write(dir.path().join(format!("{}.json", locale.code())), content).unwrap();
    }

    #[googletest::test]
    fn table_lookup_ignores_case() {
        let table = TranslationTable::new(Locale::DeDe, [("Block.Minecraft.Stone", "Stein")]);

        expect_that!(table.get("block.minecraft.stone"), some(eq("Stein")));
        expect_that!(table.get("BLOCK.MINECRAFT.STONE"), some(eq("Stein")));
        expect_that!(table.get("block.minecraft.dirt"), none());
        expect_that!(table.locale(), eq(Locale::DeDe));
    }

    #[googletest::test]
    fn keys_are_sorted_and_lowercase() {
        let table = TranslationTable::new(Locale::EnUs, [("b.KEY", "2"), ("a.key", "1")]);

        expect_that!(table.keys(), elements_are![eq(&"a.key"), eq(&"b.key")]);
        expect_that!(table.len(), eq(2));
        expect_that!(table.is_empty(), eq(false));
    }

    #[rstest]
    fn json_loader_reads_file() {
        let dir = TempDir::new().unwrap();
        write_lang(&dir, Locale::DeDe, r#"{"block.minecraft.stone": "Stein"}"#.as_bytes());

        let table = JsonDirLoader::new(dir.path()).load(Locale::DeDe).unwrap();

        assert_eq!(table.get("block.minecraft.stone"), Some("Stein"));
        assert_eq!(table.len(), 1);
    }

    #[rstest]
    fn json_loader_skips_bom() {
        let dir = TempDir::new().unwrap();
        let mut content = BOM.to_vec();
        content.extend_from_slice("{\"a\": \"ä\"}".as_bytes());
        write_lang(&dir, Locale::DeDe, &content);

        let table = JsonDirLoader::new(dir.path()).load(Locale::DeDe).unwrap();

        assert_eq!(table.get("a"), Some("ä"));
    }

    #[rstest]
    fn json_loader_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let loader = JsonDirLoader::new(dir.path());

        let err = loader.load(Locale::FrFr).unwrap_err();

        assert_eq!(
            err,
            LoadError::ResourceNotFound { locale: Locale::FrFr, path: loader.path_for(Locale::FrFr) }
        );
    }

    #[rstest]
    #[case(b"not json".as_slice())]
    #[case(br#"{"a": 1}"#.as_slice())]
    #[case(br#"["a"]"#.as_slice())]
    fn json_loader_malformed_is_parse_error(#[case] content: &[u8]) {
        let dir = TempDir::new().unwrap();
        write_lang(&dir, Locale::JaJp, content);

        let err = JsonDirLoader::new(dir.path()).load(Locale::JaJp).unwrap_err();

        assert!(matches!(err, LoadError::Parse { locale: Locale::JaJp, .. }), "{err:?}");
    }

    #[rstest]
    fn static_loader_serves_registered_locales_only() {
        let loader = StaticLoader::new().with(Locale::DeDe, [("k", "v")]);

        assert_eq!(loader.load(Locale::DeDe).unwrap().get("k"), Some("v"));
        assert!(matches!(
            loader.load(Locale::EnUs),
            Err(LoadError::ResourceNotFound { locale: Locale::EnUs, .. })
        ));
    }
}
