//! Read-only view of which locales are in use.

use std::fmt;

use serde::Serialize;

use crate::locale::Locale;

/// One tracked locale and how many consumers hold it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocaleUsage {
    /// The locale
    pub locale: Locale,
    /// Registered consumers, always positive
    pub consumers: u32,
}

/// Tracked locales in the order they were first registered.
///
/// `Display` renders the operator table:
///
/// ```text
/// Locale  :  Used
/// de_de   :  2
/// en_us   :  1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageSnapshot {
    /// Rows in registration order
    entries: Vec<LocaleUsage>,
}

impl UsageSnapshot {
    /// Wraps rows that are already in registration order.
    pub(crate) const fn new(entries: Vec<LocaleUsage>) -> Self {
        Self { entries }
    }

    /// All rows, oldest registration first.
    #[must_use]
    pub fn entries(&self) -> &[LocaleUsage] {
        &self.entries
    }

    /// Consumer count for `locale`, zero when untracked.
    #[must_use]
    pub fn consumers(&self, locale: Locale) -> u32 {
        self.entries.iter().find(|e| e.locale == locale).map_or(0, |e| e.consumers)
    }

    /// No locale is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for UsageSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Locale  :  Used")?;
        for entry in &self.entries {
            writeln!(f, "{:<7} :  {}", entry.locale.code(), entry.consumers)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[googletest::test]
    fn renders_padded_table() {
        let snapshot = UsageSnapshot::new(vec![
            LocaleUsage { locale: Locale::DeDe, consumers: 2 },
            LocaleUsage { locale: Locale::ZlmArab, consumers: 1 },
        ]);

        expect_that!(
            snapshot.to_string(),
            eq("Locale  :  Used\nde_de   :  2\nzlm_arab :  1\n")
        );
    }

    #[googletest::test]
    fn consumers_defaults_to_zero() {
        let snapshot = UsageSnapshot::new(vec![LocaleUsage { locale: Locale::DeDe, consumers: 3 }]);

        expect_that!(snapshot.consumers(Locale::DeDe), eq(3));
        expect_that!(snapshot.consumers(Locale::EnUs), eq(0));
        expect_that!(snapshot.is_empty(), eq(false));
    }
}
