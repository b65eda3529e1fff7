use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while tailing the log file
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Could not open file {}: {source}", path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur when emitting notifications
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur during configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML render error: {0}")]
    RenderError(#[from] toml::ser::Error),
}

/// Errors that end the monitoring loop
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Tailer failure: {0}")]
    Collector(#[from] CollectorError),

    #[error("Notification failure: {0}")]
    Alert(#[from] AlertError),
}
