/// Line classification rules
pub mod rules;
/// Fixed-window error counter and alert trigger
pub mod window_counter;

pub use rules::{normalize_line, ErrorSignatureRule, LineRule};
pub use window_counter::WindowCounter;
