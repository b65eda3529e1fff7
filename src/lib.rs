/// Error types for the log monitor
pub mod error;

/// Notification events
pub mod events;

/// Log file tailer
pub mod collectors;

/// Line classification and the window counter
pub mod triggers;

/// Notification delivery
pub mod alerts;

/// Configuration management
pub mod config;

/// The monitoring loop
pub mod monitor;

// Re-export commonly used types
pub use config::Config;
pub use error::{AlertError, CollectorError, ConfigError, MonitorError};
pub use events::MonitorEvent;
pub use monitor::LogMonitor;
