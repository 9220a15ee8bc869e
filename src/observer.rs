//! Notifications about cache population and eviction.

use std::fmt;
use std::panic::{
    AssertUnwindSafe,
    catch_unwind,
};
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};

use crate::locale::Locale;

/// Why a table left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvictionCause {
    /// Not accessed within the idle timeout.
    Idle,
    /// The last registered consumer of the locale went away.
    Released,
    /// Removed on request via `invalidate`.
    Invalidated,
    /// Removed by `clear` at shutdown.
    Cleared,
}

impl fmt::Display for EvictionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Released => "released",
            Self::Invalidated => "invalidated",
            Self::Cleared => "cleared",
        })
    }
}

/// Side-effect only hook into cache transitions.
///
/// Called synchronously after the transition is committed and with no cache
/// lock held, so implementations may call back into the cache. Callers outside
/// the cache may hold their own locks; [`SessionTracker`] holds the session's
/// entry while releasing its old locale.
///
/// [`SessionTracker`]: crate::session::SessionTracker
pub trait CacheObserver: Send + Sync {
    /// A table was loaded and stored.
    fn on_populate(&self, locale: Locale);

    /// A ready table was dropped.
    fn on_evict(&self, locale: Locale, cause: EvictionCause);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CacheObserver for NoopObserver {
    fn on_populate(&self, _locale: Locale) {}

    fn on_evict(&self, _locale: Locale, _cause: EvictionCause) {}
}

/// Logs cache transitions through `tracing` while `verbose` is on.
#[derive(Debug, Default)]
pub struct TracingObserver {
    /// Whether transitions are logged
    verbose: AtomicBool,
}

impl TracingObserver {
    /// Observer starting with logging on or off.
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose: AtomicBool::new(verbose) }
    }

    /// Transitions are currently logged.
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    /// Switches logging on or off and logs the new state either way.
    pub fn set_verbose(&self, verbose: bool) {
        self.verbose.store(verbose, Ordering::Relaxed);
        tracing::info!("Cache changes are {}", if verbose { "shown" } else { "hidden" });
    }
}

impl CacheObserver for TracingObserver {
    fn on_populate(&self, locale: Locale) {
        if self.is_verbose() {
            tracing::info!(locale = %locale, "'{}' loaded into cache", locale);
        }
    }

    fn on_evict(&self, locale: Locale, cause: EvictionCause) {
        if self.is_verbose() {
            tracing::info!(locale = %locale, %cause, "'{}' cleared from cache", locale);
        }
    }
}

/// Runs an observer callback, containing any panic so it never reaches the caller.
pub(crate) fn notify(what: &str, f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        tracing::warn!("Cache observer panicked during {what}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io;
    use std::sync::{
        Arc,
        Mutex,
    };

    use googletest::prelude::*;

    use super::*;

    /// Log output collected in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Everything logged at `info` and above while `f` runs.
    fn logged(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[googletest::test]
    fn quiet_observer_logs_nothing() {
        let observer = TracingObserver::new(false);

        let output = logged(|| {
            observer.on_populate(Locale::DeDe);
            observer.on_evict(Locale::DeDe, EvictionCause::Released);
        });

        expect_that!(observer.is_verbose(), eq(false));
        expect_that!(output, eq(""));
    }

    #[googletest::test]
    fn verbose_observer_logs_transitions() {
        let observer = TracingObserver::new(true);

        let output = logged(|| {
            observer.on_populate(Locale::DeDe);
            observer.on_evict(Locale::DeDe, EvictionCause::Released);
        });

        expect_that!(output, contains_substring("'de_de' loaded into cache"));
        expect_that!(output, contains_substring("'de_de' cleared from cache"));
    }

    #[googletest::test]
    fn toggling_confirms_either_way() {
        let observer = TracingObserver::new(true);

        let output = logged(|| {
            observer.set_verbose(false);
            observer.on_populate(Locale::FrFr);
            observer.set_verbose(true);
        });

        expect_that!(observer.is_verbose(), eq(true));
        expect_that!(output, contains_substring("Cache changes are hidden"));
        expect_that!(output, contains_substring("Cache changes are shown"));
        expect_that!(output, not(contains_substring("loaded into cache")));
    }

    #[googletest::test]
    #[allow(clippy::panic)]
    fn notify_contains_panics() {
        let mut ran = false;
        notify("test", || ran = true);
        expect_that!(ran, eq(true));

        notify("test", || panic!("observer failure"));
    }

    #[googletest::test]
    fn cause_display() {
        expect_that!(EvictionCause::Idle.to_string(), eq("idle"));
        expect_that!(EvictionCause::Released.to_string(), eq("released"));
    }
}
