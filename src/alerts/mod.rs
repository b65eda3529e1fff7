/// Notification delivery for monitor events
pub mod notifier;

pub use notifier::{ConsoleNotifier, Notifier};
