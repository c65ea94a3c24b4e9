//! Log sinks injected into the pipeline.
//!
//! The engine never talks to a global logger directly; it writes leveled
//! messages to a [`LogSink`]. The default [`NoopSink`] discards them, and the
//! presence or absence of a sink never changes what the pipeline produces.

use std::sync::Mutex;

pub use tracing::Level;

/// Receives leveled messages from the pipeline and its stages.
pub trait LogSink {
    fn log(&self, level: Level, message: &str);

    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn log(&self, _level: Level, _message: &str) {}
}

/// Forwards messages to `tracing` under the `assay` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "assay", "{}", message),
            Level::WARN => tracing::warn!(target: "assay", "{}", message),
            Level::INFO => tracing::info!(target: "assay", "{}", message),
            Level::DEBUG => tracing::debug!(target: "assay", "{}", message),
            _ => tracing::trace!(target: "assay", "{}", message),
        }
    }
}

/// A captured log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Messages logged at exactly the given level.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level,
                message: message.to_string(),
            });
        }
    }
}

impl<T: LogSink + ?Sized> LogSink for &T {
    fn log(&self, level: Level, message: &str) {
        (**self).log(level, message);
    }
}
