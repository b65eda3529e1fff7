use anyhow::Context;
use clap::Parser;
use log::{debug, error, info, warn};
use logsentry::alerts::ConsoleNotifier;
use logsentry::config::Config;
use logsentry::error::ConfigError;
use logsentry::monitor::LogMonitor;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

/// Command-line arguments for the log monitor
#[derive(Parser, Debug)]
#[command(
    name = "logsentry",
    about = "Tail a log file and alert on bursts of error lines",
    long_about = "Follows a growing log file from its end, counts lines containing an error \
                  signature within a fixed window, and prints an alert when the count reaches \
                  the threshold."
)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Configuration file path (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log file to tail (overrides the config file)
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Errors within one window that raise an alert (overrides the config file)
    #[arg(short, long, value_name = "N")]
    threshold: Option<usize>,

    /// Window length in seconds (overrides the config file)
    #[arg(short, long, value_name = "SECS")]
    window: Option<u64>,

    /// Enable verbose logging
    #[arg(
        short,
        long,
        help = "Enable verbose logging output (sets RUST_LOG=debug)"
    )]
    verbose: bool,
}

impl Cli {
    /// Validate the CLI arguments
    ///
    /// # Returns
    ///
    /// `Ok(())` if all arguments are valid, `Err(String)` with error message otherwise
    fn validate(&self) -> Result<(), String> {
        if let Some(ref config_path) = self.config {
            // Missing files fall back to defaults in load_config
            if config_path.exists() {
                if !config_path.is_file() {
                    return Err(format!(
                        "Configuration path is not a file: {}",
                        config_path.display()
                    ));
                }

                if let Some(extension) = config_path.extension() {
                    if extension != "toml" {
                        warn!(
                            "Configuration file does not have .toml extension: {}",
                            config_path.display()
                        );
                    }
                }
            }
        }

        if let Some(ref file) = self.file {
            if file.is_dir() {
                return Err(format!("Log file path is a directory: {}", file.display()));
            }
        }

        Ok(())
    }

    /// Apply command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref file) = self.file {
            config.log_file = file.clone();
        }
        if let Some(threshold) = self.threshold {
            config.error_threshold = threshold;
        }
        if let Some(window) = self.window {
            config.window_seconds = window;
        }
    }
}

/// Load configuration from file or use defaults
///
/// A missing or unreadable file falls back to defaults with a warning; an
/// invalid one is reported and also falls back to defaults.
fn load_config(config_path: Option<&Path>) -> Config {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            match Config::from_file(path) {
                Ok(config) => config,
                Err(ConfigError::ReadError(e)) => {
                    warn!(
                        "Configuration file '{}' not found or unreadable ({}), using defaults",
                        path.display(),
                        e
                    );
                    Config::default()
                }
                Err(e) => {
                    error!("Configuration error in '{}': {}", path.display(), e);
                    warn!("Using default configuration due to invalid config file");
                    Config::default()
                }
            }
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    }
}

/// Log the configuration the monitor will run with, as TOML
///
/// Only visible with `--verbose` or `RUST_LOG=debug`. A rendering failure is
/// logged and otherwise ignored.
fn log_effective_config(config: &Config) {
    match config.to_toml_string() {
        Ok(rendered) => debug!("Effective configuration:\n{}", rendered.trim_end()),
        Err(e) => warn!("Could not render effective configuration: {}", e),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    cli.validate().map_err(anyhow::Error::msg)?;

    let mut config = load_config(cli.config.as_deref());
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;
    log_effective_config(&config);

    let (shutdown_sender, shutdown_receiver) = watch::channel(false);
    ctrlc::set_handler(move || {
        info!("Received interrupt signal (SIGINT), shutting down gracefully...");
        if let Err(e) = shutdown_sender.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
    })
    .context("Error setting SIGINT handler for graceful shutdown")?;

    let mut monitor = LogMonitor::new(config, Box::new(ConsoleNotifier::stdout()));
    monitor
        .run(shutdown_receiver)
        .await
        .context("Critical Failure")?;

    info!("Log monitor shutdown complete");
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, TempDir};

    fn cli() -> Cli {
        Cli {
            config: None,
            file: None,
            threshold: None,
            window: None,
            verbose: false,
        }
    }

    #[test]
    fn test_cli_parses_all_flags() {
        let cli = Cli::try_parse_from([
            "logsentry",
            "--config",
            "sentry.toml",
            "--file",
            "app.log",
            "--threshold",
            "5",
            "--window",
            "30",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("sentry.toml")));
        assert_eq!(cli.file, Some(PathBuf::from("app.log")));
        assert_eq!(cli.threshold, Some(5));
        assert_eq!(cli.window, Some(30));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_rejects_non_numeric_threshold() {
        assert!(Cli::try_parse_from(["logsentry", "--threshold", "many"]).is_err());
    }

    #[test]
    fn test_cli_validation_with_existing_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "error_threshold = 4").unwrap();

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            ..cli()
        };
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_validation_with_missing_file() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/config.toml")),
            ..cli()
        };

        // Missing files are handled by falling back to defaults
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_validation_with_directory() {
        let dir = TempDir::new().unwrap();

        let config_dir = Cli {
            config: Some(dir.path().to_path_buf()),
            ..cli()
        };
        assert!(config_dir.validate().is_err());

        let log_dir = Cli {
            file: Some(dir.path().to_path_buf()),
            ..cli()
        };
        assert!(log_dir.validate().is_err());
    }

    #[test]
    fn test_cli_validation_no_config() {
        assert!(cli().validate().is_ok());
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let overrides = Cli {
            file: Some(PathBuf::from("app.log")),
            threshold: Some(10),
            window: Some(60),
            ..cli()
        };

        let mut config = Config::default();
        overrides.apply_overrides(&mut config);

        assert_eq!(config.log_file, PathBuf::from("app.log"));
        assert_eq!(config.error_threshold, 10);
        assert_eq!(config.window_seconds, 60);
        assert_eq!(config.poll_interval_ms, Config::default().poll_interval_ms);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let mut config = Config::default();
        cli().apply_overrides(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_effective_config_renders_overrides() {
        let overrides = Cli {
            file: Some(PathBuf::from("app.log")),
            threshold: Some(9),
            ..cli()
        };
        let mut config = Config::default();
        overrides.apply_overrides(&mut config);

        let rendered = config.to_toml_string().unwrap();
        assert!(rendered.contains("log_file = \"app.log\""));
        assert!(rendered.contains("error_threshold = 9"));

        // Logging must not panic whatever the logger state
        log_effective_config(&config);
    }

    #[test]
    fn test_load_config_fallbacks() {
        assert_eq!(load_config(None), Config::default());
        assert_eq!(
            load_config(Some(Path::new("/nonexistent/config.toml"))),
            Config::default()
        );

        let mut invalid = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(invalid, "error_threshold = 0").unwrap();
        assert_eq!(load_config(Some(invalid.path())), Config::default());

        let mut valid = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(valid, "error_threshold = 7").unwrap();
        assert_eq!(load_config(Some(valid.path())).error_threshold, 7);
    }
}
