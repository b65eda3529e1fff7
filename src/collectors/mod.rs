/// Tailer that follows a growing log file line by line
pub mod file_tailer;

pub use file_tailer::{ensure_log_file_exists, FileTailer};
