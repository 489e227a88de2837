//! Arguments and helpers shared by every command.

use super::Host;
use crate::Result;
use crate::db::{Database, LoadOptions};
use crate::reports::generate_diagnostics;
use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use std::io::{IsTerminal, Write, stdout};

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

impl ColorMode {
    /// Whether to style output written to stdout.
    #[must_use]
    pub fn use_colors(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => stdout().is_terminal(),
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments accepted by every command
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Root directory of the result database
    #[arg(long, value_name = "PATH", default_value = "./results", env = "BENCHFACTS_RESULT_DB", global = true)]
    pub result_db: Utf8PathBuf,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto", global = true)]
    pub color: ColorMode,
}

impl CommonArgs {
    /// Settings every command uses to read the database.
    #[must_use]
    #[expect(clippy::unused_self, reason = "no flag overrides the defaults yet")]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::default()
    }
}

/// Initialize logger based on log level
///
/// Only the first call in a process installs a logger.
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// Load the database named by the common arguments and report any artifacts
/// that could not be parsed on the error stream.
pub async fn open_database<H: Host>(host: &mut H, common: &CommonArgs) -> Result<Database> {
    let db = Database::load(&common.result_db, &common.load_options()).await?;

    let mut summary = String::new();
    generate_diagnostics(&db, false, &mut summary)?;
    if !summary.is_empty() {
        let _ = write!(host.error(), "{summary}");
    }

    Ok(db)
}

/// Report a failed command and exit with status 1.
pub fn fail<H: Host, T>(host: &mut H, what: &str, e: ohno::AppError) -> Result<T> {
    let _ = writeln!(host.error(), "❌ {what} failed: {e}");
    host.exit(1);
    Err(e)
}
