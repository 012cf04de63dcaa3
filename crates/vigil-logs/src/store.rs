//! In-memory log storage with bounded retention.
//!
//! This module provides [`LogStore`], a thread-safe ring of structured log
//! entries. The ring is capped at a fixed entry count; the oldest entries
//! are dropped on every append so memory bounds stay deterministic.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::{LogEntry, LogFilter};

/// Default number of log entries retained.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Thread-safe in-memory log store with bounded retention.
#[derive(Debug)]
pub struct LogStore {
    max_entries: usize,
    entries: Arc<RwLock<VecDeque<LogEntry>>>,
}

impl LogStore {
    /// Creates a new log store keeping at most `max_entries` entries.
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            entries: Arc::new(RwLock::new(VecDeque::new())),
        }
    }

    /// Returns the retention cap.
    #[must_use]
    pub const fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Appends a new entry, evicting the oldest beyond the cap.
    pub fn append(&self, entry: LogEntry) {
        let mut entries = self.entries.write();
        entries.push_back(entry);
        while entries.len() > self.max_entries {
            entries.pop_front();
        }
    }

    /// Queries entries matching the filter, most-recent-first.
    ///
    /// At most `limit` entries are returned.
    #[must_use]
    pub fn query(&self, filter: &LogFilter, limit: usize) -> Vec<LogEntry> {
        let entries = self.entries.read();
        entries
            .iter()
            .rev()
            .filter(|e| e.matches(filter))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Returns the total number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let entries = self.entries.read();
        entries.len()
    }

    /// Returns true if the store has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all entries.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.clear();
    }
}

impl Clone for LogStore {
    fn clone(&self) -> Self {
        Self {
            max_entries: self.max_entries,
            entries: Arc::clone(&self.entries),
        }
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogLevel;

    fn entry(level: LogLevel, service: &str, message: &str) -> LogEntry {
        LogEntry::now(level, service, message)
    }

    #[test]
    fn append_and_len() {
        let store = LogStore::default();
        store.append(entry(LogLevel::Info, "health", "probe ok"));
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
    }

    #[test]
    fn append_evicts_oldest_beyond_cap() {
        let store = LogStore::new(3);
        for i in 0..5 {
            store.append(entry(LogLevel::Info, "svc", &format!("message {i}")));
        }

        assert_eq!(store.len(), 3);
        let all = store.query(&LogFilter::default(), 10);
        // Most-recent-first; the oldest two were dropped
        assert_eq!(all[0].message, "message 4");
        assert_eq!(all[2].message, "message 2");
    }

    #[test]
    fn query_filters_by_level_and_service() {
        let store = LogStore::default();
        store.append(entry(LogLevel::Info, "health", "a"));
        store.append(entry(LogLevel::Error, "alerts", "b"));
        store.append(entry(LogLevel::Error, "health", "c"));

        let filter = LogFilter {
            level: Some(LogLevel::Error),
            service: Some("health".to_string()),
            ..Default::default()
        };
        let results = store.query(&filter, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].message, "c");
    }

    #[test]
    fn query_respects_limit() {
        let store = LogStore::default();
        for i in 0..10 {
            store.append(entry(LogLevel::Info, "svc", &format!("message {i}")));
        }

        let results = store.query(&LogFilter::default(), 4);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].message, "message 9");
    }

    #[test]
    fn clear_empties_the_store() {
        let store = LogStore::default();
        store.append(entry(LogLevel::Info, "svc", "x"));
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn cloned_store_shares_entries() {
        let store1 = LogStore::default();
        let store2 = store1.clone();

        store1.append(entry(LogLevel::Info, "svc", "shared"));
        assert_eq!(store2.len(), 1);
    }
}
