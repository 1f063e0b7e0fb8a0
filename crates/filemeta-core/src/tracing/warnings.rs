//! Warning sinks for recovered problems.

use std::sync::Mutex;

/// Receives human-readable warnings about recovered problems
/// (bad `syntax:` values, unknown checks, failed checks, missing mandatory checks).
pub trait WarningSink: Send + Sync {
    fn warn(&self, message: &str);
}

/// Forwards warnings to `tracing` at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingWarnings;

impl WarningSink for TracingWarnings {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "filemeta", "{message}");
    }
}

/// Keeps every warning in memory. Used by tests and by hosts that
/// want to render warnings themselves.
#[derive(Debug, Default)]
pub struct CollectedWarnings {
    messages: Mutex<Vec<String>>,
}

impl CollectedWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the warnings received so far, in arrival order.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WarningSink for CollectedWarnings {
    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}
