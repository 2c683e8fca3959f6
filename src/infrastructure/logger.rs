//! Logger sinks for path-addressed resolution diagnostics.

use std::fmt;

use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Severe,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Severe => "severe",
        };
        f.write_str(label)
    }
}

/// Receives diagnostics tagged with the dotted path they concern.
pub trait LogSink {
    fn log(&self, level: LogLevel, path: &str, message: &str);

    fn info(&self, path: &str, message: &str) {
        self.log(LogLevel::Info, path, message);
    }

    fn warning(&self, path: &str, message: &str) {
        self.log(LogLevel::Warning, path, message);
    }

    fn severe(&self, path: &str, message: &str) {
        self.log(LogLevel::Severe, path, message);
    }
}

/// Forwards to `tracing` events with `path` as a structured field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, path: &str, message: &str) {
        match level {
            LogLevel::Info => info!(path = %path, "{message}"),
            LogLevel::Warning => warn!(path = %path, "{message}"),
            LogLevel::Severe => error!(path = %path, "{message}"),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn log(&self, _level: LogLevel, _path: &str, _message: &str) {}
}
