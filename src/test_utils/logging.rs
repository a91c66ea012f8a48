//! Scoped log capture for asserting on `tracing` output in tests.
//!
//! [`capture_logs`] installs a capturing subscriber for the current thread
//! only, so tests running in parallel never see each other's events.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::Level;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;

/// A captured event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    #[must_use]
    pub fn new(level: Level, target: &str, message: &str) -> Self {
        Self {
            level,
            target: target.to_string(),
            message: message.to_string(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, key: &str, value: &str) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Events recorded by one [`capture_logs`] call, in emission order.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    entries: Vec<LogEntry>,
}

impl CapturedLogs {
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn contains_message(&self, message: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(message))
    }

    #[must_use]
    pub fn contains_level(&self, level: Level) -> bool {
        self.entries.iter().any(|e| e.level == level)
    }

    #[must_use]
    pub fn with_target(&self, target: &str) -> Vec<&LogEntry> {
        self.entries.iter().filter(|e| e.target == target).collect()
    }

    #[must_use]
    pub fn filter_by_level(&self, level: Level) -> Vec<&LogEntry> {
        self.entries.iter().filter(|e| e.level == level).collect()
    }

    /// Human-readable dump for assertion failures.
    #[must_use]
    pub fn format_for_display(&self) -> String {
        if self.entries.is_empty() {
            return String::from("No logs captured");
        }
        let mut output = format!("Captured {} log entries:\n", self.entries.len());
        for entry in &self.entries {
            let _ = writeln!(output, "[{}] {}: {}", entry.level, entry.target, entry.message);
            for (key, value) in &entry.fields {
                let _ = writeln!(output, "    {key} = {value}");
            }
        }
        output
    }
}

struct CaptureLayer {
    storage: Arc<Mutex<CapturedLogs>>,
}

struct EntryVisitor<'a> {
    message: &'a mut String,
    fields: &'a mut Vec<(String, String)>,
}

impl Visit for EntryVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let value = format!("{value:?}");
        if field.name() == "message" {
            *self.message = value;
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut entry = LogEntry::new(*metadata.level(), metadata.target(), "");
        event.record(&mut EntryVisitor {
            message: &mut entry.message,
            fields: &mut entry.fields,
        });
        self.storage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

/// Run `f` with every event at any level captured, returning its result and
/// the events.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, CapturedLogs) {
    let storage = Arc::new(Mutex::new(CapturedLogs::default()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        storage: Arc::clone(&storage),
    });
    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = storage
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    (result, logs)
}

/// Assert that a captured event has `level` and a message containing `text`.
#[macro_export]
macro_rules! assert_logged {
    ($logs:expr, $level:expr, $text:expr) => {{
        let logs = &$logs;
        let found = logs
            .entries()
            .iter()
            .any(|e| e.level == $level && e.message.contains($text));
        assert!(
            found,
            "Expected log with level {} containing '{}'\n{}",
            $level,
            $text,
            logs.format_for_display()
        );
    }};
}
