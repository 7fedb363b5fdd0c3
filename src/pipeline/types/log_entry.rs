use chrono::Local;
use serde::{Deserialize, Serialize};

pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One human-readable event line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub time: String,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            time: time.into(),
        }
    }

    /// Entry stamped with the local wall clock.
    pub fn now(message: impl Into<String>) -> Self {
        Self::new(message, Local::now().format(LOG_TIME_FORMAT).to_string())
    }
}
