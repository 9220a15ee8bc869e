//! locale-cache
//!
//! Translates game object keys into the client's language. Translation tables
//! are loaded on first use per locale and released again once no session uses
//! the locale or nobody looked anything up for a while.

pub mod admin;
pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod locale;
pub mod observer;
pub mod session;
pub mod table;
pub mod translate;

pub use cache::{
    CacheBuilder,
    LocaleCache,
    LocaleUsage,
    UsageSnapshot,
};
pub use error::{
    LoadError,
    TranslateError,
};
pub use locale::Locale;
pub use observer::{
    CacheObserver,
    EvictionCause,
    TracingObserver,
};
pub use session::{
    SessionEvent,
    SessionId,
    SessionTracker,
};
pub use table::{
    JsonDirLoader,
    LocaleLoader,
    StaticLoader,
    TranslationTable,
};
pub use translate::Translator;
