//! C3: the per-secondary delivery pipeline. One task per secondary, strictly in id order.

use crate::primary::ack::AckTracker;
use crate::primary::health::{Health, SecondaryDescriptor};
use crate::primary::log::PrimaryLog;
use crate::primary::replication_client::{send, ReplicateOutcome};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

const BASE_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// `min(base * 2^(attempt-1), max_interval)`, `attempt` starting at 1 (`spec.md` §4.2 step 2d).
pub fn backoff_delay(attempt: u32) -> Duration {
    let shift = attempt.saturating_sub(1).min(31);
    let scaled = BASE_BACKOFF.saturating_mul(1u32.checked_shl(shift).unwrap_or(u32::MAX));
    scaled.min(MAX_BACKOFF)
}

/// Runs forever, delivering `primary_log` entries to `descriptor.endpoint` strictly in id order.
///
/// Never issues id `k+1` until id `k` has succeeded (`spec.md` §4.2's strict ordering guarantee).
/// Blocks on `descriptor.health_notify` whenever the secondary is `Unhealthy`, and on
/// `primary_log.grew` whenever it is caught up with the log's tail.
pub async fn run_pipeline(
    client: reqwest::Client,
    primary_log: Arc<PrimaryLog>,
    descriptor: Arc<SecondaryDescriptor>,
    ack_tracker: Arc<AckTracker>,
    replication_timeout: Duration,
) {
    let mut next_id_to_send: u64 = 0;
    let mut attempt: u32 = 0;

    loop {
        if descriptor.health() == Health::Unhealthy {
            let notified = descriptor.health_notify.notified();
            // Re-check after registering interest: the detector may have already flipped the
            // secondary back to Healthy (and notified) between the read above and here.
            if descriptor.health() != Health::Unhealthy {
                continue;
            }
            notified.await;
            continue;
        }

        if next_id_to_send as usize >= primary_log.len() {
            let notified = primary_log.grew.notified();
            // Re-check after registering interest: the log may have grown between the length
            // check above and here.
            if (next_id_to_send as usize) < primary_log.len() {
                continue;
            }
            notified.await;
            continue;
        }

        let Some(entry) = primary_log.get(next_id_to_send) else {
            // Length said the entry exists but a concurrent reader raced us; retry shortly.
            continue;
        };

        match send(&client, &descriptor.endpoint, &entry, replication_timeout).await {
            ReplicateOutcome::Success => {
                debug!("delivered entry {} to {}", entry.id, descriptor.endpoint);
                ack_tracker.on_ack(entry.id, &descriptor.endpoint);
                next_id_to_send += 1;
                attempt = 0;
            }
            ReplicateOutcome::Permanent(status) => {
                warn!(
                    "permanent failure replicating entry {} to {}: {}",
                    entry.id, descriptor.endpoint, status
                );
                attempt += 1;
                if !wait_or_abort(&descriptor, attempt).await {
                    continue;
                }
            }
            ReplicateOutcome::Transient(reason) => {
                attempt += 1;
                debug!(
                    "transient failure replicating entry {} to {} (attempt {}): {}",
                    entry.id, descriptor.endpoint, attempt, reason
                );
                if !wait_or_abort(&descriptor, attempt).await {
                    continue;
                }
            }
        }
    }
}

/// Sleeps the backoff interval for `attempt`, aborting early if the secondary becomes
/// `Unhealthy` mid-sleep (`spec.md` §4.2 step 2d). Returns `false` if the sleep was aborted.
///
/// The `select!` branch below races the sleep against every health transition, not just ones that
/// have already happened: the guard on `descriptor.health_notify.notified()` would otherwise be
/// evaluated once, at `select!` construction time, and never again for the life of the sleep, so a
/// transition to `Unhealthy` occurring after that point would go unobserved until the full backoff
/// elapsed. Looping on `notified()` and checking health only after each wakeup fixes that.
async fn wait_or_abort(descriptor: &SecondaryDescriptor, attempt: u32) -> bool {
    let delay = backoff_delay(attempt);
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    loop {
        let notified = descriptor.health_notify.notified();
        tokio::select! {
            _ = &mut sleep => return true,
            _ = notified => {
                if descriptor.health() == Health::Unhealthy {
                    return false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(3), Duration::from_secs(4));
        assert_eq!(backoff_delay(6), Duration::from_secs(32));
        assert_eq!(backoff_delay(7), Duration::from_secs(60));
        assert_eq!(backoff_delay(20), Duration::from_secs(60));
    }
}
