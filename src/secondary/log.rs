//! C1: the secondary's log. Idempotent, in-order, dedup'd by entry id.

use crate::entry::LogEntry;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Stores replicated entries keyed by id so that out-of-order or retried deliveries of the same
/// id are deduplicated rather than appended twice, and `read_all` always comes back sorted
/// (`spec.md` §4.7, replacing the original prototype's priority-queue-of-arrivals approach).
pub struct SecondaryLog {
    entries: Mutex<BTreeMap<u64, LogEntry>>,
}

/// Outcome of a single `replicate` call, distinguishing a fresh insert from a harmless repeat.
#[derive(Debug, Eq, PartialEq)]
pub enum ReplicateResult {
    Inserted,
    DuplicateIgnored,
}

impl SecondaryLog {
    pub fn new() -> Self {
        SecondaryLog { entries: Mutex::new(BTreeMap::new()) }
    }

    /// Inserts `entry` if its id hasn't been seen before. Safe to call with entries out of order
    /// or repeated, since the primary's pipeline may retry a delivery the secondary already has
    /// (`spec.md` §4.7).
    pub fn replicate(&self, entry: LogEntry) -> ReplicateResult {
        let mut entries = self.entries.lock().expect("secondary log mutex poisoned");
        if entries.contains_key(&entry.id) {
            ReplicateResult::DuplicateIgnored
        } else {
            entries.insert(entry.id, entry);
            ReplicateResult::Inserted
        }
    }

    /// A snapshot of the log in ascending id order. May contain gaps if ids have arrived
    /// out of order; querying clients should expect that a secondary's view can lag the primary.
    pub fn read_all(&self) -> Vec<LogEntry> {
        self.entries.lock().expect("secondary log mutex poisoned").values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("secondary log mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SecondaryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64) -> LogEntry {
        LogEntry { id, message: format!("msg-{id}"), timestamp: id as f64 }
    }

    #[test]
    fn first_insert_of_an_id_is_inserted() {
        let log = SecondaryLog::new();
        assert_eq!(log.replicate(entry(0)), ReplicateResult::Inserted);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn repeated_delivery_of_the_same_id_is_ignored() {
        let log = SecondaryLog::new();
        log.replicate(entry(0));
        assert_eq!(log.replicate(entry(0)), ReplicateResult::DuplicateIgnored);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn read_all_is_sorted_even_when_entries_arrive_out_of_order() {
        let log = SecondaryLog::new();
        log.replicate(entry(2));
        log.replicate(entry(0));
        log.replicate(entry(1));
        let ids: Vec<u64> = log.read_all().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
