//! Operator console commands.
//!
//! One command per line, words separated by whitespace:
//!
//! | Command | Effect |
//! |---|---|
//! | `usedlocales` | Table of tracked locales and their consumer counts |
//! | `cached` | Locales with a table in memory |
//! | `verbose [on\|off]` | Show or toggle cache change logging |
//! | `translate <locale> <key>` | Look up one key |
//! | `keys <locale>` | Count of keys in a locale |
//! | `join <session> <locale>` | Register a session |
//! | `locale <session> <locale>` | Change a session's locale |
//! | `quit <session>` | Deregister a session |
//! | `invalidate <locale>` | Drop a cached table |
//! | `sweep` | Drop idle tables now |
//! | `help` | List commands |

use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::locale::{
    Locale,
    UnknownLocale,
};
use crate::observer::TracingObserver;
use crate::session::{
    SessionId,
    SessionTracker,
};
use crate::translate::Translator;

/// Reply to `help`.
const HELP: &str = "\
Commands:
  usedlocales                 tracked locales and their consumers
  cached                      locales with a table in memory
  verbose [on|off]            show or toggle cache change logging
  translate <locale> <key>    look up one key
  keys <locale>               number of keys in a locale
  join <session> <locale>     register a session
  locale <session> <locale>   change a session's locale
  quit <session>              deregister a session
  invalidate <locale>         drop a cached table
  sweep                       drop idle tables now
";

/// A console line that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// First word is not a command
    #[error("Unknown command '{0}'. Type \"help\" for help.")]
    UnknownCommand(String),

    /// Missing or malformed arguments; holds the expected form
    #[error("Usage: {0}")]
    Usage(&'static str),

    /// Locale argument is not a known code
    #[error(transparent)]
    UnknownLocale(#[from] UnknownLocale),

    /// Session argument is not a number
    #[error("Invalid session id '{0}'")]
    InvalidSession(String),
}

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// `usedlocales`
    UsedLocales,
    /// `cached`
    Cached,
    /// `verbose [on|off]`; `None` reports the current state
    Verbose(Option<bool>),
    /// `translate <locale> <key>`
    Translate { locale: Locale, key: String },
    /// `keys <locale>`
    Keys(Locale),
    /// `join <session> <locale>`
    Join { session: SessionId, locale: Locale },
    /// `locale <session> <locale>`
    ChangeLocale { session: SessionId, locale: Locale },
    /// `quit <session>`
    Quit(SessionId),
    /// `invalidate <locale>`
    Invalidate(Locale),
    /// `sweep`
    Sweep,
    /// `help`
    Help,
}

/// Parses a required session id argument.
fn session_arg(arg: Option<&str>, usage: &'static str) -> Result<SessionId, CommandError> {
    let arg = arg.ok_or(CommandError::Usage(usage))?;
    arg.parse().map(SessionId).map_err(|_| CommandError::InvalidSession(arg.to_string()))
}

/// Parses a required locale code argument.
fn locale_arg(arg: Option<&str>, usage: &'static str) -> Result<Locale, CommandError> {
    Ok(arg.ok_or(CommandError::Usage(usage))?.parse()?)
}

impl FromStr for AdminCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut args = line.split_whitespace();
        let command = args.next().unwrap_or_default().to_lowercase();

        let parsed = match command.as_str() {
            "usedlocales" => Self::UsedLocales,
            "cached" => Self::Cached,
            "verbose" => Self::Verbose(match args.next() {
                None => None,
                Some("on" | "true") => Some(true),
                Some("off" | "false") => Some(false),
                Some(_) => return Err(CommandError::Usage("verbose [on|off]")),
            }),
            "translate" => {
                const USAGE: &str = "translate <locale> <key>";
                let locale = locale_arg(args.next(), USAGE)?;
                let key = args.next().ok_or(CommandError::Usage(USAGE))?.to_string();
                Self::Translate { locale, key }
            }
            "keys" => Self::Keys(locale_arg(args.next(), "keys <locale>")?),
            "join" => {
                const USAGE: &str = "join <session> <locale>";
                let session = session_arg(args.next(), USAGE)?;
                Self::Join { session, locale: locale_arg(args.next(), USAGE)? }
            }
            "locale" => {
                const USAGE: &str = "locale <session> <locale>";
                let session = session_arg(args.next(), USAGE)?;
                Self::ChangeLocale { session, locale: locale_arg(args.next(), USAGE)? }
            }
            "quit" => Self::Quit(session_arg(args.next(), "quit <session>")?),
            "invalidate" => Self::Invalidate(locale_arg(args.next(), "invalidate <locale>")?),
            "sweep" => Self::Sweep,
            "help" | "?" => Self::Help,
            _ => return Err(CommandError::UnknownCommand(command)),
        };
        Ok(parsed)
    }
}

/// Executes console commands against the running services.
#[derive(Debug, Clone)]
pub struct Console {
    /// Lookups, and through it the cache
    translator: Translator,
    /// Session registry driven by `join`, `locale` and `quit`
    sessions: SessionTracker,
    /// Observer switched by `verbose`
    observer: Arc<TracingObserver>,
}

impl Console {
    /// Console over already running services.
    #[must_use]
    pub const fn new(
        translator: Translator,
        sessions: SessionTracker,
        observer: Arc<TracingObserver>,
    ) -> Self {
        Self { translator, sessions, observer }
    }

    /// Parses and runs one line, returning the text to show the operator.
    pub async fn run_line(&self, line: &str) -> String {
        match line.parse::<AdminCommand>() {
            Ok(command) => self.execute(command).await,
            Err(error) => {
                tracing::warn!("Rejected console command {line:?}: {error}");
                format!("{error}\n")
            }
        }
    }

    /// Runs a parsed command.
    pub async fn execute(&self, command: AdminCommand) -> String {
        tracing::debug!(?command, "Execute console command");
        let cache = self.translator.cache();

        match command {
            AdminCommand::UsedLocales => cache.snapshot().to_string(),
            AdminCommand::Cached => {
                let cached = cache.cached_locales();
                let codes: Vec<&str> = cached.iter().map(|locale| locale.code()).collect();
                format!("Cached: [{}]\n", codes.join(", "))
            }
            AdminCommand::Verbose(None) => {
                let state = if self.observer.is_verbose() { "shown" } else { "hidden" };
                format!("Cache changes are {state}\n")
            }
            AdminCommand::Verbose(Some(verbose)) => {
                self.observer.set_verbose(verbose);
                format!("Cache changes are {}\n", if verbose { "shown" } else { "hidden" })
            }
            AdminCommand::Translate { locale, key } => {
                match self.translator.translate(locale, &key).await {
                    Ok(value) => format!("{value}\n"),
                    Err(error) => format!("{error}\n"),
                }
            }
            AdminCommand::Keys(locale) => match self.translator.keys(locale).await {
                Ok(keys) => format!("{locale}: {} keys\n", keys.len()),
                Err(error) => format!("{error}\n"),
            },
            AdminCommand::Join { session, locale } => {
                self.sessions.register(session, locale);
                format!("Session {session} joined with {locale}\n")
            }
            AdminCommand::ChangeLocale { session, locale } => {
                self.sessions.change_locale(session, locale);
                format!("Session {session} now uses {locale}\n")
            }
            AdminCommand::Quit(session) => {
                self.sessions.deregister(session);
                format!("Session {session} left\n")
            }
            AdminCommand::Invalidate(locale) => {
                if cache.invalidate(locale) {
                    format!("'{locale}' cleared from cache\n")
                } else {
                    format!("'{locale}' was not cached\n")
                }
            }
            AdminCommand::Sweep => format!("Swept {} idle tables\n", cache.sweep_idle()),
            AdminCommand::Help => HELP.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::cache::LocaleCache;
    use crate::table::StaticLoader;

    fn console() -> Console {
        let cache =
            LocaleCache::new(StaticLoader::new().with(Locale::DeDe, [("block.minecraft.stone", "Stein")]));
        Console::new(
            Translator::new(cache.clone()),
            SessionTracker::new(cache),
            Arc::new(TracingObserver::new(false)),
        )
    }

    #[rstest]
    #[case("usedlocales", AdminCommand::UsedLocales)]
    #[case("  UsedLocales  ", AdminCommand::UsedLocales)]
    #[case("verbose", AdminCommand::Verbose(None))]
    #[case("verbose off", AdminCommand::Verbose(Some(false)))]
    #[case("translate de_DE Block.Stone", AdminCommand::Translate { locale: Locale::DeDe, key: "Block.Stone".to_string() })]
    #[case("join 3 en_us", AdminCommand::Join { session: SessionId(3), locale: Locale::EnUs })]
    #[case("quit 3", AdminCommand::Quit(SessionId(3)))]
    fn parses_commands(#[case] line: &str, #[case] expected: AdminCommand) {
        assert_eq!(line.parse::<AdminCommand>().unwrap(), expected);
    }

    #[rstest]
    #[case("", CommandError::UnknownCommand(String::new()))]
    #[case("reload", CommandError::UnknownCommand("reload".to_string()))]
    #[case("translate de_de", CommandError::Usage("translate <locale> <key>"))]
    #[case("join x de_de", CommandError::InvalidSession("x".to_string()))]
    #[case("keys klingon", CommandError::UnknownLocale(UnknownLocale("klingon".to_string())))]
    #[case("verbose maybe", CommandError::Usage("verbose [on|off]"))]
    fn rejects_bad_lines(#[case] line: &str, #[case] expected: CommandError) {
        assert_eq!(line.parse::<AdminCommand>().unwrap_err(), expected);
    }

    #[tokio::test]
    async fn session_commands_show_in_usedlocales() {
        let console = console();

        console.run_line("join 1 de_de").await;
        console.run_line("join 2 de_de").await;
        console.run_line("join 3 en_us").await;
        console.run_line("quit 3").await;

        assert_eq!(console.run_line("usedlocales").await, "Locale  :  Used\nde_de   :  2\n");
    }

    #[tokio::test]
    async fn translate_reports_value_or_error() {
        let console = console();

        assert_eq!(console.run_line("translate de_de block.minecraft.stone").await, "Stein\n");
        assert!(console.run_line("translate de_de block.minecraft.dirt").await.contains("No translation"));
        assert!(console.run_line("translate fr_fr block.minecraft.stone").await.contains("not found"));
    }

    #[tokio::test]
    async fn verbose_toggles_observer() {
        let console = console();

        assert_eq!(console.run_line("verbose on").await, "Cache changes are shown\n");
        assert!(console.observer.is_verbose());
        assert_eq!(console.run_line("verbose").await, "Cache changes are shown\n");
    }

    #[tokio::test]
    async fn invalidate_and_cached() {
        let console = console();
        console.run_line("translate de_de block.minecraft.stone").await;

        assert_eq!(console.run_line("cached").await, "Cached: [de_de]\n");
        assert_eq!(console.run_line("invalidate de_de").await, "'de_de' cleared from cache\n");
        assert_eq!(console.run_line("invalidate de_de").await, "'de_de' was not cached\n");
        assert_eq!(console.run_line("cached").await, "Cached: []\n");
    }

    #[tokio::test]
    async fn unknown_command_mentions_help() {
        let console = console();

        assert!(console.run_line("frobnicate").await.contains("Type \"help\" for help."));
        assert!(console.run_line("help").await.starts_with("Commands:"));
    }
}
