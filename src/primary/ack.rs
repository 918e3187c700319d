//! C4: per-entry acknowledgement accounting, dedup'd by `(entry_id, endpoint)`.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::Notify;

struct AckSlot {
    required: u32,
    acked_by: HashSet<String>,
    notify: Notify,
}

impl AckSlot {
    fn satisfied(&self) -> bool {
        self.acked_by.len() as u32 >= self.required
    }
}

/// Tracks, per entry id, how many distinct secondaries have confirmed storage, and releases
/// anyone waiting on that entry's write concern once enough have (`spec.md` §4.4).
pub struct AckTracker {
    slots: Mutex<HashMap<u64, AckSlot>>,
}

impl AckTracker {
    pub fn new() -> Self {
        AckTracker { slots: Mutex::new(HashMap::new()) }
    }

    /// Registers an ack requirement for `entry_id`. Call once, right after the primary appends
    /// the entry (`required` is `write_concern - 1`, i.e. acks needed beyond the primary itself).
    pub fn register(&self, entry_id: u64, required: u32) {
        let mut slots = self.slots.lock().expect("ack tracker mutex poisoned");
        slots.insert(
            entry_id,
            AckSlot { required, acked_by: HashSet::new(), notify: Notify::new() },
        );
    }

    /// Idempotent in the pair `(entry_id, endpoint)`: a retried wire-level delivery that results
    /// in a second ack from the same secondary does not double-count (`spec.md` §4.4, §9).
    pub fn on_ack(&self, entry_id: u64, endpoint: &str) {
        let mut slots = self.slots.lock().expect("ack tracker mutex poisoned");
        let Some(slot) = slots.get_mut(&entry_id) else { return };
        if slot.acked_by.insert(endpoint.to_string()) && slot.satisfied() {
            slot.notify.notify_waiters();
        }
    }

    /// Blocks until `entry_id` has reached its required ack count. No timeout: a write_concern>1
    /// append blocks for as long as it takes (`spec.md` §4.1 step v, §5).
    pub async fn wait_for(&self, entry_id: u64) {
        loop {
            let notified = {
                let slots = self.slots.lock().expect("ack tracker mutex poisoned");
                let Some(slot) = slots.get(&entry_id) else { return };
                if slot.satisfied() {
                    return;
                }
                // Register interest before releasing the lock, following `Notify`'s documented
                // pattern, so an ack landing between the check and the await is never missed.
                slot.notify.notified()
            };
            notified.await;
        }
    }
}

impl Default for AckTracker {
    fn default() -> Self {
        Self::new()
    }
}
