//! The primary's log: append-only, exclusively mutated under one lock, read lock-free.

use crate::entry::LogEntry;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// Ordered sequence of log entries, owned by the primary.
///
/// `len` is tracked separately as an atomic so pipelines can poll "has the log grown?" without
/// taking the append lock; the entries themselves are read out under a brief lock since they are
/// never mutated once appended (`spec.md` invariant 1, and the C7 ownership note in §3).
pub struct PrimaryLog {
    entries: Mutex<Vec<LogEntry>>,
    len: AtomicUsize,
    /// Fired every time the log grows, so idle pipelines caught up to the tail can wait on it
    /// instead of busy-polling (`spec.md` §4.2 step 3).
    pub grew: Notify,
}

impl PrimaryLog {
    pub fn new() -> Self {
        PrimaryLog { entries: Mutex::new(Vec::new()), len: AtomicUsize::new(0), grew: Notify::new() }
    }

    /// Appends `(message, timestamp)` under the append lock and returns the assigned entry.
    ///
    /// The assigned id always equals the log's length before the append (invariant 1); the lock
    /// also totally orders id assignment, so timestamps are monotonic non-decreasing across ids.
    pub fn append(&self, message: String, timestamp: f64) -> LogEntry {
        let mut entries = self.entries.lock().expect("primary log mutex poisoned");
        let id = entries.len() as u64;
        let entry = LogEntry { id, message, timestamp };
        entries.push(entry.clone());
        self.len.store(entries.len(), Ordering::Release);
        drop(entries);
        self.grew.notify_waiters();
        entry
    }

    /// Current length without taking the append lock.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entry at `id`, if it has been appended.
    pub fn get(&self, id: u64) -> Option<LogEntry> {
        let entries = self.entries.lock().expect("primary log mutex poisoned");
        entries.get(id as usize).cloned()
    }

    /// A snapshot of the whole log, in id order.
    pub fn read_all(&self) -> Vec<LogEntry> {
        self.entries.lock().expect("primary log mutex poisoned").clone()
    }
}

impl Default for PrimaryLog {
    fn default() -> Self {
        Self::new()
    }
}
