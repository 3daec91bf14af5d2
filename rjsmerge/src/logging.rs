//! Stderr logging for diagnostics.
//!
//! The merge engine reports through the `log` facade and never prints.
//! Front ends pick a [`LogLevel`] with [`init_logger`] and either call the
//! [`Logger`] directly or [`install`](Logger::install) it as the facade's
//! backend so engine records reach stderr too.

use std::env;
use std::fmt;

use crate::merge::Diagnostic;

/// Environment variable consulted when no verbosity flag is given.
pub const LOG_MODE_ENV: &str = "RJSMERGE_LOG_MODE";

/// Logging level for controlling output verbosity.
///
/// Ordered from least verbose to most verbose.
///
/// # Examples
///
/// ```
/// use rjsmerge::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Normal);
/// assert!(LogLevel::Normal < LogLevel::Verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Nothing but the requested output.
    Quiet,
    /// Errors, conflicts and warnings.
    Normal,
    /// Everything, including per-fragment progress.
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiet => write!(f, "quiet"),
            Self::Normal => write!(f, "normal"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

impl LogLevel {
    /// Parse `quiet`, `normal` or `verbose`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns a message naming the rejected input.
    ///
    /// # Examples
    ///
    /// ```
    /// use rjsmerge::LogLevel;
    ///
    /// assert_eq!(LogLevel::parse("VERBOSE").unwrap(), LogLevel::Verbose);
    /// assert!(LogLevel::parse("chatty").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            _ => Err(format!("invalid log level: {s}")),
        }
    }

    /// The most detailed facade level shown at this verbosity.
    #[must_use]
    pub fn filter(self) -> log::LevelFilter {
        match self {
            Self::Quiet => log::LevelFilter::Error,
            Self::Normal => log::LevelFilter::Warn,
            Self::Verbose => log::LevelFilter::Debug,
        }
    }
}

/// Stderr logger gated by a [`LogLevel`].
///
/// # Examples
///
/// ```
/// use rjsmerge::{LogLevel, Logger};
///
/// let logger = Logger::new(LogLevel::Normal);
/// logger.warn("fragment 'Vendor_Custom' overrides paths[\"mixins\"]");
/// logger.info("not shown below Verbose");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    /// Create a logger.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// The configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Print an error unless quiet.
    pub fn error(&self, message: &str) {
        if self.level >= LogLevel::Normal {
            eprintln!("ERROR: {message}");
        }
    }

    /// Print a warning unless quiet.
    pub fn warn(&self, message: &str) {
        if self.level >= LogLevel::Normal {
            eprintln!("WARN: {message}");
        }
    }

    /// Print progress when verbose.
    pub fn info(&self, message: &str) {
        if self.level >= LogLevel::Verbose {
            eprintln!("INFO: {message}");
        }
    }

    /// Print detail when verbose.
    pub fn debug(&self, message: &str) {
        if self.level >= LogLevel::Verbose {
            eprintln!("DEBUG: {message}");
        }
    }

    /// Print one diagnostic from an aggregation run as a warning.
    pub fn diagnostic(&self, diagnostic: &Diagnostic) {
        self.warn(&format!("[{}] {diagnostic}", diagnostic.kind()));
    }

    /// Route `log` facade records through this logger.
    ///
    /// Only the first call in a process takes effect; later calls return
    /// `false`.
    pub fn install(self) -> bool {
        let leaked: &'static Self = Box::leak(Box::new(self));
        let installed = log::set_logger(leaked).is_ok();
        if installed {
            log::set_max_level(self.level.filter());
        }
        installed
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Normal)
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.level.filter()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = record.args().to_string();
        match record.level() {
            log::Level::Error => self.error(&message),
            log::Level::Warn => self.warn(&message),
            log::Level::Info => self.info(&message),
            log::Level::Debug | log::Level::Trace => self.debug(&message),
        }
    }

    fn flush(&self) {}
}

/// Pick a logger from the verbosity flags, falling back to
/// [`LOG_MODE_ENV`] and then to [`LogLevel::Normal`].
///
/// `verbose` wins when both flags are set.
///
/// # Examples
///
/// ```
/// use rjsmerge::{init_logger, LogLevel};
///
/// assert_eq!(init_logger(true, true).level(), LogLevel::Verbose);
/// assert_eq!(init_logger(false, true).level(), LogLevel::Quiet);
/// ```
#[must_use]
pub fn init_logger(verbose: bool, quiet: bool) -> Logger {
    if verbose {
        return Logger::new(LogLevel::Verbose);
    }
    if quiet {
        return Logger::new(LogLevel::Quiet);
    }

    env::var(LOG_MODE_ENV)
        .ok()
        .and_then(|value| LogLevel::parse(&value).ok())
        .map_or_else(Logger::default, Logger::new)
}
