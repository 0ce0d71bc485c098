//! Notification and log sink.
//!
//! Pipeline stages report progress through a [`LogSink`] handed to them by
//! the caller. [`LogBroadcaster`] echoes entries to the terminal and fans
//! them out to any subscribers (used by tests and embedding hosts).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Log level for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Optional indentation level (for nested logs)
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }
}

/// Receives informational and error messages from the pipeline.
pub trait LogSink {
    fn log(&self, entry: LogEntry);

    fn info(&self, msg: &str) {
        self.log(LogEntry::info(msg));
    }

    fn success(&self, msg: &str) {
        self.log(LogEntry::success(msg));
    }

    fn warning(&self, msg: &str) {
        self.log(LogEntry::warning(msg));
    }

    fn error(&self, msg: &str) {
        self.log(LogEntry::error(msg));
    }

    fn info_indent(&self, msg: &str, indent: u8) {
        self.log(LogEntry::info(msg).with_indent(indent));
    }
}

/// Broadcasts log entries to all subscribers
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
    echo: bool,
}

impl LogBroadcaster {
    /// Broadcaster that also prints every entry to stderr.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender, echo: true }
    }

    /// Broadcaster that only fans out to subscribers.
    pub fn quiet() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender, echo: false }
    }

    /// Get a receiver for streaming entries
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl LogSink for LogBroadcaster {
    fn log(&self, entry: LogEntry) {
        if self.echo {
            let prefix = match entry.level {
                LogLevel::Info => "   ",
                LogLevel::Success => "   ✓",
                LogLevel::Warning => "   ⚠️",
                LogLevel::Error => "   ❌",
            };
            let indent = "   ".repeat(entry.indent as usize);
            eprintln!("{}{} {}", indent, prefix, entry.message);
        }

        // No subscribers is fine
        let _ = self.sender.send(entry);
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain everything currently buffered on a receiver.
pub fn drain(receiver: &mut broadcast::Receiver<LogEntry>) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    while let Ok(entry) = receiver.try_recv() {
        entries.push(entry);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_receives_entries() {
        let logs = LogBroadcaster::quiet();
        let mut rx = logs.subscribe();

        logs.info("starting");
        logs.warning("missing column");
        logs.info_indent("nested", 2);

        let entries = drain(&mut rx);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], LogEntry::info("starting"));
        assert_eq!(entries[1].level, LogLevel::Warning);
        assert_eq!(entries[2].indent, 2);
    }

    #[test]
    fn test_log_without_subscribers() {
        let logs = LogBroadcaster::quiet();
        logs.error("nobody listens");
    }

    #[test]
    fn test_entry_serialization() {
        let json = serde_json::to_value(LogEntry::success("done")).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["message"], "done");
        assert_eq!(json["indent"], 0);
    }
}
