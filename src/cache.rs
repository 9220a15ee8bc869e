//! Demand-driven cache of translation tables.
//!
//! Each locale has one slot holding its table (or the load producing it) and
//! the number of consumers that registered interest. A table leaves the cache
//! when it sits unused past the idle timeout, or as soon as its consumer count
//! drops to zero, whichever comes first.
//!
//! # Locking
//!
//! Slots live in a [`DashMap`]. A shard lock is held only while a slot changes
//! state; loads run on the blocking pool and observer callbacks run after the
//! lock is released. Operations on one locale are linearizable, while different
//! locales never wait on each other's loads.

/// Per-locale slot state
mod slot;
/// Consumer count snapshots
mod usage;

use std::panic::{
    AssertUnwindSafe,
    catch_unwind,
};
use std::sync::atomic::{
    AtomicU64,
    Ordering,
};
use std::sync::{
    Arc,
    Weak,
};
use std::time::{
    Duration,
    Instant,
};

use dashmap::DashMap;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use self::slot::{
    LoadResult,
    LoadState,
    SharedLoad,
    Slot,
};
pub use self::usage::{
    LocaleUsage,
    UsageSnapshot,
};
use crate::error::LoadError;
use crate::locale::Locale;
use crate::observer::{
    CacheObserver,
    EvictionCause,
    NoopObserver,
    notify,
};
use crate::table::{
    LocaleLoader,
    TranslationTable,
};

/// Two minutes without a lookup and a table is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared state behind every [`LocaleCache`] handle.
struct Inner {
    /// One slot per locale that is cached, loading or counted
    slots: DashMap<Locale, Slot>,
    /// Reads translation tables
    loader: Arc<dyn LocaleLoader>,
    /// Told about every populate and eviction
    observer: Arc<dyn CacheObserver>,
    /// Tables unused for longer than this are dropped
    idle_timeout: Duration,
    /// Source of load generations
    next_generation: AtomicU64,
    /// Source of registration order for snapshots
    next_registration: AtomicU64,
}

/// Cheaply cloneable handle to the translation table cache.
#[derive(Clone)]
pub struct LocaleCache {
    /// State shared by all clones
    inner: Arc<Inner>,
}

impl std::fmt::Debug for LocaleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleCache")
            .field("slots", &self.inner.slots.len())
            .field("idle_timeout", &self.inner.idle_timeout)
            .field("loader", &"<dyn LocaleLoader>")
            .field("observer", &"<dyn CacheObserver>")
            .finish()
    }
}

/// Configures a [`LocaleCache`].
pub struct CacheBuilder {
    /// Loader the cache will use
    loader: Arc<dyn LocaleLoader>,
    /// Observer, [`NoopObserver`] unless set
    observer: Arc<dyn CacheObserver>,
    /// Idle timeout, [`DEFAULT_IDLE_TIMEOUT`] unless set
    idle_timeout: Duration,
}

impl std::fmt::Debug for CacheBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheBuilder").field("idle_timeout", &self.idle_timeout).finish_non_exhaustive()
    }
}

impl CacheBuilder {
    /// How long an unused table stays cached.
    #[must_use]
    pub const fn idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Receives populate and evict notifications.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn CacheObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Creates the cache. Nothing is loaded until first use.
    #[must_use]
    pub fn build(self) -> LocaleCache {
        LocaleCache {
            inner: Arc::new(Inner {
                slots: DashMap::new(),
                loader: self.loader,
                observer: self.observer,
                idle_timeout: self.idle_timeout,
                next_generation: AtomicU64::new(0),
                next_registration: AtomicU64::new(0),
            }),
        }
    }
}

impl LocaleCache {
    /// Starts configuring a cache backed by `loader`.
    pub fn builder(loader: impl LocaleLoader) -> CacheBuilder {
        CacheBuilder {
            loader: Arc::new(loader),
            observer: Arc::new(NoopObserver),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Cache with the default idle timeout and no observer.
    pub fn new(loader: impl LocaleLoader) -> Self {
        Self::builder(loader).build()
    }

    /// Configured idle timeout.
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        self.inner.idle_timeout
    }

    /// Returns the table for `locale`, loading it on first use.
    ///
    /// A hit refreshes the idle timer. Concurrent callers for the same locale
    /// share a single load and receive the same table or the same error. A
    /// failed load is not remembered; the next call tries again. If an earlier
    /// load of the locale was evicted while still running, the new one starts
    /// after it finishes.
    ///
    /// Must be polled inside a tokio runtime: the loader runs on its blocking pool.
    pub async fn get_or_load(&self, locale: Locale) -> Result<Arc<TranslationTable>, LoadError> {
        let (load, expired) = {
            let now = Instant::now();
            let mut slot = self.inner.slots.entry(locale).or_default();
            let expired = slot.expire_if_idle(now, self.inner.idle_timeout);

            let load = match &mut slot.state {
                LoadState::Ready { table, last_access } => {
                    *last_access = now;
                    return Ok(Arc::clone(table));
                }
                LoadState::Loading { load, .. } => load.clone(),
                LoadState::Detached { load, .. } => {
                    let previous = load.clone();
                    let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
                    let load = Inner::start_load(&self.inner, locale, generation, Some(previous));
                    slot.state = LoadState::Loading { generation, load: load.clone() };
                    load
                }
                LoadState::Absent => {
                    let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
                    let load = Inner::start_load(&self.inner, locale, generation, None);
                    slot.state = LoadState::Loading { generation, load: load.clone() };
                    load
                }
            };
            (load, expired)
        };

        if expired {
            self.inner.notify_evict(locale, EvictionCause::Idle);
        }

        load.await
    }

    /// The cached table, if present and not past its idle deadline.
    ///
    /// Neither loads nor refreshes the idle timer.
    #[must_use]
    pub fn peek(&self, locale: Locale) -> Option<Arc<TranslationTable>> {
        let slot = self.inner.slots.get(&locale)?;
        slot.fresh_table(Instant::now(), self.inner.idle_timeout).cloned()
    }

    /// Locales that currently have a table cached, sorted by code.
    #[must_use]
    pub fn cached_locales(&self) -> Vec<Locale> {
        let now = Instant::now();
        let mut locales: Vec<Locale> = self
            .inner
            .slots
            .iter()
            .filter(|entry| entry.fresh_table(now, self.inner.idle_timeout).is_some())
            .map(|entry| *entry.key())
            .collect();
        locales.sort_unstable_by_key(|locale| locale.code());
        locales
    }

    /// Drops the table for `locale`. Idempotent.
    ///
    /// An in-flight load is detached: its callers still get the result, but it
    /// is not stored, and the next load waits for it to finish. Returns `true`
    /// if a ready table was removed.
    pub fn invalidate(&self, locale: Locale) -> bool {
        let evicted = self.inner.slots.get_mut(&locale).is_some_and(|mut slot| slot.evict());
        self.inner.remove_if_vacant(locale);

        if evicted {
            self.inner.notify_evict(locale, EvictionCause::Invalidated);
        }
        evicted
    }

    /// Registers one more consumer of `locale`.
    pub fn increment(&self, locale: Locale) {
        let mut slot = self.inner.slots.entry(locale).or_default();
        if slot.consumers == 0 {
            slot.registered_at = self.inner.next_registration.fetch_add(1, Ordering::Relaxed);
        }
        slot.consumers = slot.consumers.saturating_add(1);
        tracing::trace!(locale = %locale, consumers = slot.consumers, "Locale consumer registered");
    }

    /// Releases one consumer of `locale`.
    ///
    /// When the count reaches zero the locale stops being tracked and its table
    /// is evicted at once. `None` and untracked locales are ignored, so a
    /// consumer that never registered cannot push a count below zero or evict
    /// a table someone else loaded.
    pub fn decrement(&self, locale: impl Into<Option<Locale>>) {
        let Some(locale) = locale.into() else {
            tracing::debug!("Ignoring release of a consumer without a locale");
            return;
        };

        let evicted = {
            let Some(mut slot) = self.inner.slots.get_mut(&locale) else {
                tracing::debug!(locale = %locale, "Ignoring release of an untracked locale");
                return;
            };
            if slot.consumers == 0 {
                tracing::debug!(locale = %locale, "Ignoring release of an untracked locale");
                return;
            }

            slot.consumers -= 1;
            tracing::trace!(locale = %locale, consumers = slot.consumers, "Locale consumer released");
            if slot.consumers > 0 {
                return;
            }
            slot.evict()
        };
        self.inner.remove_if_vacant(locale);

        if evicted {
            self.inner.notify_evict(locale, EvictionCause::Released);
        }
    }

    /// Consumers currently registered for `locale`.
    #[must_use]
    pub fn consumers(&self, locale: Locale) -> u32 {
        self.inner.slots.get(&locale).map_or(0, |slot| slot.consumers)
    }

    /// Tracked locales and their consumer counts, in registration order.
    #[must_use]
    pub fn snapshot(&self) -> UsageSnapshot {
        let mut rows: Vec<(u64, LocaleUsage)> = self
            .inner
            .slots
            .iter()
            .filter(|entry| entry.consumers > 0)
            .map(|entry| {
                (entry.registered_at, LocaleUsage { locale: *entry.key(), consumers: entry.consumers })
            })
            .collect();
        rows.sort_unstable_by_key(|(registered_at, _)| *registered_at);
        UsageSnapshot::new(rows.into_iter().map(|(_, usage)| usage).collect())
    }

    /// Drops every table that has been idle past the timeout.
    ///
    /// Lookups already expire stale tables lazily; sweeping releases the
    /// memory of locales nobody asks for again. Returns how many were dropped.
    pub fn sweep_idle(&self) -> usize {
        let now = Instant::now();
        let idle = self.inner.idle_timeout;
        let mut expired = Vec::new();

        self.inner.slots.retain(|locale, slot| {
            if slot.expire_if_idle(now, idle) {
                expired.push(*locale);
            }
            !slot.is_vacant()
        });

        for locale in &expired {
            self.inner.notify_evict(*locale, EvictionCause::Idle);
        }
        expired.len()
    }

    /// Runs [`sweep_idle`](Self::sweep_idle) every `period` until the cache is dropped.
    ///
    /// The task holds only a weak reference, so it never keeps the cache alive.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(sweep_loop(inner, period))
    }

    /// Drops every cached table and detaches in-flight loads. Consumer counts survive.
    ///
    /// Returns how many ready tables were removed.
    pub fn clear(&self) -> usize {
        let mut evicted = Vec::new();
        self.inner.slots.retain(|locale, slot| {
            if slot.evict() {
                evicted.push(*locale);
            }
            !slot.is_vacant()
        });

        for locale in &evicted {
            self.inner.notify_evict(*locale, EvictionCause::Cleared);
        }
        evicted.len()
    }
}

/// Body of the sweeper task.
async fn sweep_loop(inner: Weak<Inner>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            tracing::debug!("Cache dropped, stopping idle sweeper");
            break;
        };
        let removed = LocaleCache { inner }.sweep_idle();
        if removed > 0 {
            tracing::debug!(removed, "Swept idle translation tables");
        }
    }
}

impl Inner {
    /// Spawns the loader for `locale` on the blocking pool.
    ///
    /// With a `previous` detached load, the loader is only called once that
    /// load has finished. The task records its own result in the slot, so the
    /// cache settles even if every caller stops waiting.
    fn start_load(
        this: &Arc<Self>,
        locale: Locale,
        generation: u64,
        previous: Option<SharedLoad>,
    ) -> SharedLoad {
        tracing::debug!(locale = %locale, generation, "Loading translation table");

        let inner = Arc::clone(this);
        let task = tokio::spawn(async move {
            if let Some(previous) = previous {
                tracing::debug!(locale = %locale, generation, "Waiting for detached load");
                let _ = previous.await;
            }

            let loader = Arc::clone(&inner.loader);
            let result = tokio::task::spawn_blocking(move || {
                catch_unwind(AssertUnwindSafe(|| loader.load(locale)))
                    .unwrap_or_else(|_| {
                        Err(LoadError::Unavailable { locale, reason: "loader panicked".to_string() })
                    })
                    .map(Arc::new)
            })
            .await
            .unwrap_or_else(|err| {
                Err(LoadError::Unavailable { locale, reason: format!("load task failed: {err}") })
            });
            inner.complete_load(locale, generation, &result);
            result
        });

        let inner = Arc::clone(this);
        async move {
            match task.await {
                Ok(result) => result,
                Err(err) => {
                    let result = Err(LoadError::Unavailable {
                        locale,
                        reason: format!("load task failed: {err}"),
                    });
                    inner.complete_load(locale, generation, &result);
                    result
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Stores the result of load `generation` unless the slot moved on meanwhile.
    fn complete_load(&self, locale: Locale, generation: u64, result: &LoadResult) {
        let populated = {
            let Some(mut slot) = self.slots.get_mut(&locale) else {
                return;
            };
            if !slot.is_loading(generation) {
                tracing::debug!(locale = %locale, generation, "Discarding detached load");
                slot.finish_detached(generation);
                drop(slot);
                self.remove_if_vacant(locale);
                return;
            }

            match result {
                Ok(table) => {
                    slot.state =
                        LoadState::Ready { table: Arc::clone(table), last_access: Instant::now() };
                    true
                }
                Err(err) => {
                    tracing::warn!(locale = %locale, "Failed to load translations: {err}");
                    slot.state = LoadState::Absent;
                    false
                }
            }
        };

        if populated {
            let observer = &self.observer;
            notify("populate", || observer.on_populate(locale));
        } else {
            self.remove_if_vacant(locale);
        }
    }

    /// Drops the slot once nothing is cached, loading or counted.
    fn remove_if_vacant(&self, locale: Locale) {
        self.slots.remove_if(&locale, |_, slot| slot.is_vacant());
    }

    /// Logs an eviction and tells the observer. Call without holding a slot.
    fn notify_evict(&self, locale: Locale, cause: EvictionCause) {
        tracing::debug!(locale = %locale, %cause, "Translation table evicted");
        let observer = &self.observer;
        notify("evict", || observer.on_evict(locale, cause));
    }
}
