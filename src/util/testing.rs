use std::cell::RefCell;
use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::infrastructure::logger::{LogLevel, LogSink};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // Create a filter for noisy modules
    let noisy_modules = ["rstest"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// One diagnostic captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub path: String,
    pub message: String,
}

/// Log sink that keeps every record for later assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: RefCell<Vec<LogRecord>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<LogRecord> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.level == LogLevel::Warning)
            .cloned()
            .collect()
    }

    /// Paths of all warnings, in emission order.
    pub fn warning_paths(&self) -> Vec<String> {
        self.warnings().into_iter().map(|r| r.path).collect()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl LogSink for RecordingSink {
    fn log(&self, level: LogLevel, path: &str, message: &str) {
        self.records.borrow_mut().push(LogRecord {
            level,
            path: path.to_string(),
            message: message.to_string(),
        });
    }
}

// test
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_mixed_levels_when_recorded_then_warnings_filtered() {
        let sink = RecordingSink::new();
        sink.info("a", "hello");
        sink.warning("a.b", "careful");
        sink.severe("c", "boom");

        assert_eq!(sink.records().len(), 3);
        assert_eq!(sink.warning_paths(), vec!["a.b".to_string()]);

        sink.clear();
        assert!(sink.records().is_empty());
    }
}
