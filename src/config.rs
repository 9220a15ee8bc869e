//! Settings for the cache and the console.
/// Config file loader
mod loader;
/// Settings owner
mod manager;
/// Settings types and validation
mod types;

pub use manager::ConfigManager;
pub use types::{
    CacheSettings,
    ConfigError,
    ValidationError,
};
