//! The event log: tagged, human-readable entries about what the dispatcher did.
//!
//! Entries are emitted as `tracing` events carrying the configured tag, so the
//! subscriber installed by `main` decides where they end up.

use crate::core::{EventLog, Severity};
use tracing::{error, info, warn};

/// Writes event-log entries through `tracing`.
#[derive(Debug, Clone)]
pub struct TracingEventLog {
    tag: String,
}

impl TracingEventLog {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl EventLog for TracingEventLog {
    fn record(&self, severity: Severity, message: &str) {
        let tag = self.tag.as_str();
        match severity {
            Severity::Info => info!(tag, "{}", message),
            Severity::Warning => warn!(tag, "{}", message),
            Severity::Error => error!(tag, "{}", message),
        }
    }
}
