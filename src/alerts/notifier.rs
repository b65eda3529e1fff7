use crate::error::AlertError;
use crate::events::MonitorEvent;
use log::{log, Level};
use std::io::{self, Stdout, Write};

const BANNER_RULE: &str = "#############################################";

/// Destination for monitor status events
///
/// The monitor hands every event to its notifier in the order the events
/// occur. Implementations must not drop or reorder them.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send {
    /// Deliver one event
    fn notify(&mut self, event: &MonitorEvent) -> Result<(), AlertError>;
}

/// Renders events as human-readable status lines on a writer
///
/// Production code writes to stdout; tests pass a `Vec<u8>`. Each event is
/// flushed as soon as it is written so lines appear while the monitor waits
/// for more input.
#[derive(Debug)]
pub struct ConsoleNotifier<W: Write + Send> {
    /// Where rendered lines go
    out: W,
}

impl ConsoleNotifier<Stdout> {
    /// Create a notifier that prints to standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleNotifier<W> {
    /// Create a notifier writing to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the notifier and return its writer
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render an event as the text printed for it, trailing newline included
    pub fn render(event: &MonitorEvent) -> String {
        match event {
            MonitorEvent::Started {
                log_file,
                threshold,
                window_seconds,
            } => format!(
                "🚀 Log Monitor started on {}\nThreshold: {} errors | Window: {}s\n",
                log_file.display(),
                threshold,
                window_seconds
            ),
            MonitorEvent::ErrorDetected { line, count } => {
                format!("⚠️  Detected Error: {} (Total in window: {})\n", line, count)
            }
            MonitorEvent::WindowReset { cleared } => {
                format!("--- Window Reset: Cleared {} errors ---\n", cleared)
            }
            MonitorEvent::Alert { count } => format!(
                "\n{rule}\n🚨 ALERT: High Error Rate Detected!\nObserved {count} errors in the last window.\n{rule}\n\n",
                rule = BANNER_RULE,
                count = count
            ),
        }
    }

    /// Log level an event is reported at
    ///
    /// Detections are warnings and alerts are errors, so the default log
    /// filter shows both while lifecycle events stay at info.
    pub fn log_level(event: &MonitorEvent) -> Level {
        match event {
            MonitorEvent::Started { .. } | MonitorEvent::WindowReset { .. } => Level::Info,
            MonitorEvent::ErrorDetected { .. } => Level::Warn,
            MonitorEvent::Alert { .. } => Level::Error,
        }
    }

    fn log_event(event: &MonitorEvent) {
        let level = Self::log_level(event);
        match event {
            MonitorEvent::Started {
                log_file,
                threshold,
                window_seconds,
            } => log!(
                level,
                "Monitoring {} (threshold {}, window {}s)",
                log_file.display(),
                threshold,
                window_seconds
            ),
            MonitorEvent::ErrorDetected { line, count } => {
                log!(level, "Error line #{} in window: {}", count, line)
            }
            MonitorEvent::WindowReset { cleared } => {
                log!(level, "Window elapsed, cleared {} errors", cleared)
            }
            MonitorEvent::Alert { count } => log!(level, "Alert raised after {} errors", count),
        }
    }
}

impl<W: Write + Send> Notifier for ConsoleNotifier<W> {
    fn notify(&mut self, event: &MonitorEvent) -> Result<(), AlertError> {
        Self::log_event(event);
        self.out.write_all(Self::render(event).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
