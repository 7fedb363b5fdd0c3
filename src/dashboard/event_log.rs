use std::collections::VecDeque;

use crate::pipeline::types::LogEntry;

pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// Bounded, most-recent-first list of events. Front is newest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Adds a newest entry, evicting the oldest once over capacity.
    pub fn prepend(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Shorthand for prepending an entry stamped now.
    pub fn record(&mut self, message: impl Into<String>) {
        self.prepend(LogEntry::now(message));
    }

    /// Replaces the whole list. Input is expected newest first; extras past capacity are dropped.
    pub fn replace(&mut self, entries: Vec<LogEntry>) {
        self.entries = entries.into_iter().take(self.capacity).collect();
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn newest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
