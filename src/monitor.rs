//! The monitoring loop
//!
//! `LogMonitor` ties the tailer, the line rule, the window counter and the
//! notifier together. Everything runs on one task: a biased `tokio::select!`
//! checks for shutdown, then for the window timer, and only then waits on the
//! next line, so a timer tick is never processed after a line read that
//! happened later.

use crate::alerts::Notifier;
use crate::collectors::FileTailer;
use crate::config::Config;
use crate::error::{AlertError, MonitorError};
use crate::events::MonitorEvent;
use crate::triggers::{normalize_line, ErrorSignatureRule, LineRule, WindowCounter};
use log::{debug, info};
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// One outcome of the select in the monitoring loop
enum Step {
    Shutdown,
    WindowElapsed,
    Line(String),
}

/// Tails the configured file and raises alerts on bursts of error lines
pub struct LogMonitor {
    /// Monitoring parameters, fixed for the monitor's lifetime
    config: Config,
    /// Decides which lines count as errors
    rule: Box<dyn LineRule>,
    /// Error count for the current window
    counter: WindowCounter,
    /// Receives every status event
    notifier: Box<dyn Notifier>,
}

impl LogMonitor {
    /// Create a monitor for `config` that reports through `notifier`
    ///
    /// The line rule is built from `config.markers`.
    pub fn new(config: Config, notifier: Box<dyn Notifier>) -> Self {
        let rule = Box::new(ErrorSignatureRule::new(&config.markers));
        let counter = WindowCounter::new(config.error_threshold);
        Self {
            config,
            rule,
            counter,
            notifier,
        }
    }

    /// Replace the line rule
    pub fn with_rule(mut self, rule: Box<dyn LineRule>) -> Self {
        self.rule = rule;
        self
    }

    /// Configuration the monitor was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current error count in the window
    pub fn error_count(&self) -> usize {
        self.counter.count()
    }

    /// Classify one line and update the window
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the line matched the rule
    ///
    /// # Errors
    ///
    /// Returns `AlertError` if the notifier fails to deliver an event.
    pub fn handle_line(&mut self, line: &str) -> Result<bool, AlertError> {
        if !self.rule.matches(line) {
            return Ok(false);
        }

        for event in self.counter.on_match(&normalize_line(line)) {
            self.notifier.notify(&event)?;
        }
        Ok(true)
    }

    /// Apply a window timer tick
    ///
    /// # Errors
    ///
    /// Returns `AlertError` if the notifier fails to deliver the reset event.
    pub fn handle_window_elapsed(&mut self) -> Result<(), AlertError> {
        match self.counter.on_window_elapsed() {
            Some(event) => self.notifier.notify(&event),
            None => Ok(()),
        }
    }

    /// Run until `shutdown` carries `true` or its sender is dropped
    ///
    /// Opens the file (creating it if needed) and seeks to its end before the
    /// first event is emitted. The first window ends one full window after
    /// the file is opened. The file is closed on every return path.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Config` if the configuration does not validate,
    /// `MonitorError::Collector` if the file cannot be opened or a read fails,
    /// and `MonitorError::Alert` if the notifier fails.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), MonitorError> {
        self.config.validate()?;

        let mut tailer =
            FileTailer::open(&self.config.log_file, self.config.poll_interval()).await?;

        self.notifier.notify(&MonitorEvent::Started {
            log_file: self.config.log_file.clone(),
            threshold: self.counter.threshold(),
            window_seconds: self.config.window_seconds,
        })?;

        let window = self.config.window();
        let mut ticker = interval_at(Instant::now() + window, window);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let step = tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => Step::Shutdown,
                _ = ticker.tick() => Step::WindowElapsed,
                line = tailer.next_line() => Step::Line(line?),
            };

            match step {
                Step::Shutdown => {
                    info!("Shutdown requested, stopping monitor");
                    break;
                }
                Step::WindowElapsed => self.handle_window_elapsed()?,
                Step::Line(line) => {
                    if !self.handle_line(&line)? {
                        debug!("Ignoring line: {}", line);
                    }
                }
            }
        }

        info!(
            "Stopped tailing {} at byte offset {}",
            tailer.path().display(),
            tailer.position()
        );
        Ok(())
    }
}

/// Resolve once shutdown is requested or can no longer be requested
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
