//! Monitoring parameters
//!
//! Loaded once at startup (TOML file, then command-line overrides) and
//! immutable for the lifetime of the monitor.

use crate::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default file tailed when none is configured
pub const DEFAULT_LOG_FILE: &str = "access.log";
/// Default number of matches within one window that raises an alert
pub const DEFAULT_ERROR_THRESHOLD: usize = 3;
/// Default counting window in seconds
pub const DEFAULT_WINDOW_SECONDS: u64 = 10;
/// Default pause after a read that found no complete line
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
/// Longest accepted counting window: one day
pub const MAX_WINDOW_SECONDS: u64 = 24 * 60 * 60;

/// Configuration for the log monitor
///
/// Every field has a default, so an empty TOML document is a valid config:
///
/// ```toml
/// log_file = "access.log"
/// error_threshold = 3
/// window_seconds = 10
/// poll_interval_ms = 500
/// markers = ["ERROR", "500"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// File to tail; created empty if missing
    pub log_file: PathBuf,
    /// Matches within one window that raise an alert
    pub error_threshold: usize,
    /// Length of the counting window in seconds, at most `MAX_WINDOW_SECONDS`
    pub window_seconds: u64,
    /// Pause in milliseconds when no complete line is available
    pub poll_interval_ms: u64,
    /// Substrings that mark a line as an error (matched case-insensitively)
    pub markers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            window_seconds: DEFAULT_WINDOW_SECONDS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            markers: vec!["ERROR".to_string(), "500".to_string()],
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read,
    /// `ConfigError::TomlError` if it is not valid TOML for this schema, and
    /// `ConfigError::ValidationError` if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        debug!("Read {} bytes of configuration from {}", content.len(), path.display());
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable by the monitor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "log_file must not be empty".to_string(),
            ));
        }
        if self.error_threshold == 0 {
            return Err(ConfigError::ValidationError(
                "error_threshold must be at least 1".to_string(),
            ));
        }
        if self.window_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "window_seconds must be at least 1".to_string(),
            ));
        }
        if self.window_seconds > MAX_WINDOW_SECONDS {
            return Err(ConfigError::ValidationError(format!(
                "window_seconds must be at most {} (got {})",
                MAX_WINDOW_SECONDS, self.window_seconds
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.markers.is_empty() {
            return Err(ConfigError::ValidationError(
                "markers must contain at least one entry".to_string(),
            ));
        }
        if self.markers.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "markers must not contain blank entries".to_string(),
            ));
        }
        Ok(())
    }

    /// Render the configuration as a TOML document
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Counting window as a `Duration`
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    /// Poll pause as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_file, PathBuf::from("access.log"));
        assert_eq!(config.error_threshold, 3);
        assert_eq!(config.window(), Duration::from_secs(10));
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.markers, vec!["ERROR", "500"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = Config::from_toml_str("error_threshold = 5\nlog_file = \"app.log\"").unwrap();
        assert_eq!(config.error_threshold, 5);
        assert_eq!(config.log_file, PathBuf::from("app.log"));
        assert_eq!(config.window_seconds, DEFAULT_WINDOW_SECONDS);
        assert_eq!(config.markers, Config::default().markers);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = Config::from_toml_str("threshold = 5");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let result = Config::from_toml_str("window_seconds = \"ten\"");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_validation_failures() {
        let cases = [
            "error_threshold = 0",
            "window_seconds = 0",
            "window_seconds = 86401",
            "window_seconds = 9223372036854775807",
            "poll_interval_ms = 0",
            "markers = []",
            "markers = [\"ERROR\", \"  \"]",
            "log_file = \"\"",
        ];

        for case in cases {
            let result = Config::from_toml_str(case);
            assert!(
                matches!(result, Err(ConfigError::ValidationError(_))),
                "expected validation error for {:?}, got {:?}",
                case,
                result
            );
        }
    }

    #[test]
    fn test_window_bounds() {
        let longest = Config {
            window_seconds: MAX_WINDOW_SECONDS,
            ..Config::default()
        };
        assert!(longest.validate().is_ok());

        let overflowing = Config {
            window_seconds: u64::MAX,
            ..Config::default()
        };
        assert!(matches!(
            overflowing.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_toml_rendering_round_trips() {
        let config = Config {
            log_file: PathBuf::from("/var/log/nginx/access.log"),
            error_threshold: 7,
            window_seconds: 45,
            poll_interval_ms: 250,
            markers: vec!["FATAL".to_string(), "503".to_string()],
        };

        let rendered = config.to_toml_string().unwrap();
        assert!(rendered.contains("error_threshold = 7"));
        assert_eq!(Config::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "window_seconds = 30").unwrap();
        writeln!(file, "markers = [\"fatal\"]").unwrap();
        file.flush().unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.window(), Duration::from_secs(30));
        assert_eq!(config.markers, vec!["fatal"]);
    }

    #[test]
    fn test_from_missing_file() {
        let result = Config::from_file(Path::new("/nonexistent/logsentry.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
