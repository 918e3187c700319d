//! The unit of replication: an immutable, monotonically-identified log entry.

use serde::{Deserialize, Serialize};

/// A single entry in the replicated log.
///
/// Immutable once created. `id` is assigned by the primary and is contiguous starting at 0;
/// `timestamp` is wall-clock seconds at the time the primary appended the entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub message: String,
    pub timestamp: f64,
}
