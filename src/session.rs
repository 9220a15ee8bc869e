//! Consumer lifecycle: which session uses which locale.
//!
//! Every connected session counts as one consumer of its locale. Joining,
//! switching language and leaving are turned into reference count changes on
//! the cache, and re-published as [`SessionEvent`]s for anyone who wants to
//! translate something at those moments.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::broadcast;

use crate::cache::LocaleCache;
use crate::locale::Locale;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Identifies one connected consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Published after the reference counts have been updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session started using `locale`.
    Joined { session: SessionId, locale: Locale },
    /// A session switched from `old_locale` to `locale`.
    LocaleChanged { session: SessionId, locale: Locale, old_locale: Locale },
    /// A session went away. `locale` is `None` if it never registered one.
    Left { session: SessionId, locale: Option<Locale> },
}

/// Tracks the locale of every session and keeps the cache's counts in step.
///
/// Operations on the same session are serialized by the session map's entry
/// lock, which is held across the count update. A locale change that releases
/// the last consumer therefore runs the cache observer with that entry locked.
#[derive(Clone)]
pub struct SessionTracker {
    /// Cache whose counts follow the sessions
    cache: LocaleCache,
    /// Current locale of every known session
    sessions: Arc<DashMap<SessionId, Locale>>,
    /// Lifecycle event publisher
    events: broadcast::Sender<SessionEvent>,
}

impl fmt::Debug for SessionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTracker")
            .field("sessions", &self.sessions.len())
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

impl SessionTracker {
    /// Tracker with no sessions, updating counts in `cache`.
    #[must_use]
    pub fn new(cache: LocaleCache) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { cache, sessions: Arc::new(DashMap::new()), events }
    }

    /// Receives events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// A session connected using `locale`.
    ///
    /// Registering an already known session is treated as a locale change.
    pub fn register(&self, session: SessionId, locale: Locale) {
        self.set_locale(session, locale);
    }

    /// Registers sessions that were connected before tracking started.
    pub fn register_all(&self, sessions: impl IntoIterator<Item = (SessionId, Locale)>) {
        for (session, locale) in sessions {
            self.register(session, locale);
        }
    }

    /// A session switched its client language.
    ///
    /// The new locale is counted before the old one is released, so a table
    /// still in use elsewhere is never dropped in between.
    pub fn change_locale(&self, session: SessionId, locale: Locale) {
        self.set_locale(session, locale);
    }

    /// A session disconnected. Unknown sessions release nothing.
    pub fn deregister(&self, session: SessionId) {
        let locale = self.sessions.remove(&session).map(|(_, locale)| locale);
        self.cache.decrement(locale);
        tracing::debug!(%session, ?locale, "Session left");
        self.publish(SessionEvent::Left { session, locale });
    }

    /// Locale the session last reported.
    #[must_use]
    pub fn locale_of(&self, session: SessionId) -> Option<Locale> {
        self.sessions.get(&session).map(|entry| *entry)
    }

    /// Connected sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// No session is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Records `locale` for `session` and moves its count over.
    fn set_locale(&self, session: SessionId, locale: Locale) {
        let event = match self.sessions.entry(session) {
            Entry::Occupied(mut entry) => {
                let old_locale = *entry.get();
                if old_locale == locale {
                    return;
                }
                entry.insert(locale);
                self.cache.increment(locale);
                self.cache.decrement(old_locale);
                SessionEvent::LocaleChanged { session, locale, old_locale }
            }
            Entry::Vacant(entry) => {
                let _entry = entry.insert(locale);
                self.cache.increment(locale);
                SessionEvent::Joined { session, locale }
            }
        };
        tracing::debug!(%session, locale = %locale, "Session locale set");
        self.publish(event);
    }

    /// Sends `event` to current subscribers.
    fn publish(&self, event: SessionEvent) {
        // Sending only fails when nobody subscribed.
        let _ = self.events.send(event);
    }
}
