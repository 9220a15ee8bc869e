//! Operator console for the translation cache.
//!
//! Usage: `locale-cache [ROOT]`. Settings come from `ROOT/.locale-cache.json`
//! (default: the current directory); commands are read from stdin.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use locale_cache::admin::Console;
use locale_cache::config::{
    CacheSettings,
    ConfigManager,
};
use locale_cache::{
    JsonDirLoader,
    LocaleCache,
    SessionTracker,
    TracingObserver,
    Translator,
};
use tokio::io::{
    AsyncBufReadExt,
    AsyncWriteExt,
    BufReader,
};
use tracing_subscriber::EnvFilter;

/// Runs the console until stdin closes, then empties the cache.
#[tokio::main]
async fn main() -> ExitCode {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .init();

    let root = std::env::args_os().nth(1).map_or_else(|| PathBuf::from("."), PathBuf::from);
    let mut config_manager = ConfigManager::new();
    if let Err(error) = config_manager.load_settings(Some(root)) {
        tracing::error!("Configuration error: {error}");
        return ExitCode::FAILURE;
    }
    let settings: CacheSettings = config_manager.get_settings().clone();

    let observer = Arc::new(TracingObserver::new(false));
    observer.set_verbose(settings.verbose);

    let cache = LocaleCache::builder(JsonDirLoader::new(config_manager.lang_dir()))
        .idle_timeout(settings.idle_timeout())
        .observer(observer.clone())
        .build();
    let sweeper = cache.spawn_sweeper(settings.sweep_interval());
    let console =
        Console::new(Translator::new(cache.clone()), SessionTracker::new(cache.clone()), observer);

    let result = serve(&console).await;

    sweeper.abort();
    cache.clear();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("Console I/O failed: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Reads commands until EOF or `exit`.
async fn serve(console: &Console) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") {
            break;
        }

        let output = console.run_line(line).await;
        stdout.write_all(output.as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}
