//! Logging capability injected into the audit pipeline.
//!
//! Components receive an `Arc<dyn AuditLogger>` instead of writing to a
//! global logger, so a host (CLI, build integration, test) decides where
//! messages go. [`TracingLogger`] forwards everything to `tracing`.

use std::sync::Arc;

/// Importance of an informational message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Low,
    #[default]
    Normal,
    High,
}

pub trait AuditLogger: Send + Sync {
    fn log_message(&self, message: &str, level: LogLevel);
    fn log_warning(&self, message: &str);
    fn log_error(&self, message: &str);
}

/// Forwards audit messages to the `tracing` subscriber installed by the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn shared() -> Arc<dyn AuditLogger> {
        Arc::new(TracingLogger)
    }
}

impl AuditLogger for TracingLogger {
    fn log_message(&self, message: &str, level: LogLevel) {
        match level {
            LogLevel::Low => tracing::debug!("{}", message),
            LogLevel::Normal => tracing::info!("{}", message),
            LogLevel::High => tracing::info!(importance = "high", "{}", message),
        }
    }

    fn log_warning(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn log_error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Entry {
        Message(LogLevel, String),
        Warning(String),
        Error(String),
    }

    /// Records every call so tests can assert on what was logged.
    #[derive(Default)]
    pub struct RecordingLogger {
        entries: Mutex<Vec<Entry>>,
    }

    impl RecordingLogger {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn entries(&self) -> Vec<Entry> {
            self.entries.lock().unwrap().clone()
        }

        pub fn messages_containing(&self, needle: &str) -> usize {
            self.entries()
                .iter()
                .filter(|e| matches!(e, Entry::Message(_, m) if m.contains(needle)))
                .count()
        }

        pub fn errors(&self) -> Vec<String> {
            self.entries()
                .into_iter()
                .filter_map(|e| match e {
                    Entry::Error(m) => Some(m),
                    _ => None,
                })
                .collect()
        }

        pub fn warnings(&self) -> Vec<String> {
            self.entries()
                .into_iter()
                .filter_map(|e| match e {
                    Entry::Warning(m) => Some(m),
                    _ => None,
                })
                .collect()
        }
    }

    impl AuditLogger for RecordingLogger {
        fn log_message(&self, message: &str, level: LogLevel) {
            self.entries
                .lock()
                .unwrap()
                .push(Entry::Message(level, message.to_string()));
        }

        fn log_warning(&self, message: &str) {
            self.entries
                .lock()
                .unwrap()
                .push(Entry::Warning(message.to_string()));
        }

        fn log_error(&self, message: &str) {
            self.entries
                .lock()
                .unwrap()
                .push(Entry::Error(message.to_string()));
        }
    }
}
