use crate::events::MonitorEvent;
use log::debug;

/// Error counter for one fixed window
///
/// The window is not sliding: the count is cleared whenever the window timer
/// fires, and also immediately after the threshold raises an alert. The
/// counter itself is timer-agnostic; the caller reports ticks through
/// `on_window_elapsed`.
#[derive(Debug, Clone)]
pub struct WindowCounter {
    /// Matches seen since the last reset
    count: usize,
    /// Count at which an alert is raised
    threshold: usize,
}

impl WindowCounter {
    /// Create a counter that alerts once `threshold` matches are seen
    ///
    /// A threshold of zero is treated as one, so every match alerts.
    pub fn new(threshold: usize) -> Self {
        Self {
            count: 0,
            threshold: threshold.max(1),
        }
    }

    /// Current count in the window
    pub fn count(&self) -> usize {
        self.count
    }

    /// Count at which an alert is raised
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Record a matching line
    ///
    /// # Returns
    ///
    /// An `ErrorDetected` event, followed by an `Alert` event if this match
    /// reached the threshold. The count is zero after an alert.
    pub fn on_match(&mut self, line: &str) -> Vec<MonitorEvent> {
        self.count += 1;

        let mut events = vec![MonitorEvent::ErrorDetected {
            line: line.to_string(),
            count: self.count,
        }];

        if self.count >= self.threshold {
            events.push(MonitorEvent::Alert { count: self.count });
            debug!("Threshold {} reached, resetting count", self.threshold);
            self.count = 0;
        }

        events
    }

    /// Handle the window timer firing
    ///
    /// # Returns
    ///
    /// A `WindowReset` event if anything was counted, `None` otherwise.
    pub fn on_window_elapsed(&mut self) -> Option<MonitorEvent> {
        if self.count == 0 {
            return None;
        }

        let cleared = std::mem::take(&mut self.count);
        Some(MonitorEvent::WindowReset { cleared })
    }
}
