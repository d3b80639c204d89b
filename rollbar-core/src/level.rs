use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Severity of a log event as produced by the logging pipeline.
///
/// Levels are ordered from least to most severe, so a minimum level can be
/// expressed with a plain comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Very detailed diagnostics.
    Trace,
    /// Internal diagnostics.
    Debug,
    /// Normal operation.
    Info,
    /// Something unexpected that did not stop the operation.
    Warning,
    /// An operation failed.
    Error,
    /// The process or a subsystem cannot continue.
    Fatal,
}

impl LogLevel {
    /// All levels, from least to most severe.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Returns the canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        LogLevel::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(Error::LevelOutOfRange(value))
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "trace" | "verbose" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" | "information" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            "fatal" | "critical" => LogLevel::Fatal,
            _ => return Err(Error::UnknownLevel(s.to_owned())),
        })
    }
}

/// Severity vocabulary understood by Rollbar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLevel {
    /// `debug`
    Debug,
    /// `info`
    Info,
    /// `warning`
    Warning,
    /// `error`
    Error,
    /// `critical`
    Critical,
}

impl ErrorLevel {
    /// Returns the tag sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorLevel::Debug => "debug",
            ErrorLevel::Info => "info",
            ErrorLevel::Warning => "warning",
            ErrorLevel::Error => "error",
            ErrorLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for ErrorLevel {
    fn from(level: LogLevel) -> Self {
        convert_log_level(level)
    }
}

/// Converts a [`LogLevel`] to a Rollbar [`ErrorLevel`].
pub fn convert_log_level(level: LogLevel) -> ErrorLevel {
    match level {
        LogLevel::Trace | LogLevel::Debug => ErrorLevel::Debug,
        LogLevel::Info => ErrorLevel::Info,
        LogLevel::Warning => ErrorLevel::Warning,
        LogLevel::Error => ErrorLevel::Error,
        LogLevel::Fatal => ErrorLevel::Critical,
    }
}
