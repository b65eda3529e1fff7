//! Notification events emitted by the log monitor
//!
//! Every human-visible status line the monitor produces corresponds to one
//! `MonitorEvent`. The window counter produces them, the notifier renders them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A status change observed by the monitoring loop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// Monitoring began on the given file
    Started {
        /// File being tailed
        log_file: PathBuf,
        /// Matches within one window that raise an alert
        threshold: usize,
        /// Length of the counting window in seconds
        window_seconds: u64,
    },
    /// A line matched the error signature
    ErrorDetected {
        /// The normalized (trimmed, upper-cased) line
        line: String,
        /// Running count in the current window, including this line
        count: usize,
    },
    /// The window timer cleared a non-zero count
    WindowReset {
        /// Count held just before the reset
        cleared: usize,
    },
    /// The threshold was reached
    Alert {
        /// Number of errors observed when the alert fired
        count: usize,
    },
}

impl MonitorEvent {
    /// Whether this event is an alert
    pub fn is_alert(&self) -> bool {
        matches!(self, MonitorEvent::Alert { .. })
    }
}
