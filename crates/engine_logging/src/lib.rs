#![deny(missing_docs)]
//! Shared logging utilities for the collector workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! the logger initialization used by the application, and a minimal test
//! initializer for the global logger.
//!
//! Log lines emitted through the macros carry the current collection round
//! once a run has started, so a log file can be read back per iteration.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Default log file written next to the working directory.
pub const DEFAULT_LOG_FILE: &str = "./collector.log";

/// Current collection round. Zero means no run is in progress.
static ROUND: AtomicU64 = AtomicU64::new(0);

/// Sets the collection round reported by the logging macros.
/// The collector loop calls this once per iteration and resets it to 0 when done.
pub fn set_round(round: u64) {
    ROUND.store(round, Ordering::Relaxed);
}

/// Retrieves the collection round reported by the logging macros.
pub fn current_round() -> u64 {
    ROUND.load(Ordering::Relaxed)
}

#[doc(hidden)]
pub use log;

/// Forwards a formatted message to `log`, prefixed with the current round.
#[doc(hidden)]
pub fn __log(level: log::Level, args: std::fmt::Arguments<'_>) {
    match current_round() {
        0 => log::log!(level, "{}", args),
        round => log::log!(level, "[round {}] {}", round, args),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        $crate::__log($crate::log::Level::Trace, format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        $crate::__log($crate::log::Level::Info, format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        $crate::__log($crate::log::Level::Debug, format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        $crate::__log($crate::log::Level::Warn, format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        $crate::__log($crate::log::Level::Error, format_args!($($arg)*));
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to the given file, truncating it.
    File(PathBuf),
    /// Write to the terminal.
    Terminal,
    /// Write to both the terminal and the given file.
    Both(PathBuf),
}

impl Default for LogDestination {
    fn default() -> Self {
        LogDestination::Both(PathBuf::from(DEFAULT_LOG_FILE))
    }
}

/// Initialize the global logger with the specified destination.
///
/// A file that cannot be created is reported on stderr and skipped; the
/// terminal logger is still installed for `Both`.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File(path) => match create_file_logger(&path, level, config) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => {
            vec![TermLogger::new(
                level,
                config,
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )]
        }
        LogDestination::Both(path) => {
            let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
                level,
                config.clone(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )];
            if let Some(file_logger) = create_file_logger(&path, level, config) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    path: &Path,
    level: LevelFilter,
    config: Config,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_defaults_to_zero_and_can_be_set() {
        set_round(0);
        assert_eq!(current_round(), 0);
        set_round(7);
        assert_eq!(current_round(), 7);
        set_round(0);
    }

    #[test]
    fn default_destination_logs_to_terminal_and_file() {
        assert_eq!(
            LogDestination::default(),
            LogDestination::Both(PathBuf::from(DEFAULT_LOG_FILE))
        );
    }

    #[test]
    fn file_logger_is_skipped_for_unwritable_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("missing").join("collector.log");
        assert!(create_file_logger(&missing, LevelFilter::Info, build_config()).is_none());
    }
}
