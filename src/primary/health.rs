//! C5: the heartbeat-based failure detector, and the per-secondary descriptor it drives.

use log::{debug, info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Failure-detector state for one secondary. Starts `Unknown` and stays non-`Healthy` until a
/// heartbeat actually succeeds (`spec.md` §4.5).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum Health {
    Unknown,
    Healthy,
    Suspected,
    Unhealthy,
}

impl Health {
    fn from_code(code: u8) -> Self {
        match code {
            1 => Health::Healthy,
            2 => Health::Suspected,
            3 => Health::Unhealthy,
            _ => Health::Unknown,
        }
    }

    fn to_code(self) -> u8 {
        match self {
            Health::Unknown => 0,
            Health::Healthy => 1,
            Health::Suspected => 2,
            Health::Unhealthy => 3,
        }
    }
}

/// Per-secondary state mutated only by the failure detector (health, consecutive_failures) and
/// read by every other component without locking (`spec.md` §3 ownership notes).
pub struct SecondaryDescriptor {
    pub endpoint: String,
    health: AtomicU8,
    consecutive_failures: AtomicU32,
    /// Fired (broadcast, level-checked by readers) whenever this secondary becomes `Healthy`.
    /// This is the `wake_signal` from `spec.md` §4.2/§4.5.
    pub health_notify: Notify,
}

impl SecondaryDescriptor {
    pub fn new(endpoint: String) -> Self {
        SecondaryDescriptor {
            endpoint,
            health: AtomicU8::new(Health::Unknown.to_code()),
            consecutive_failures: AtomicU32::new(0),
            health_notify: Notify::new(),
        }
    }

    pub fn health(&self) -> Health {
        Health::from_code(self.health.load(Ordering::Acquire))
    }

    fn set_health(&self, health: Health) {
        self.health.store(health.to_code(), Ordering::Release);
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Acquire)
    }
}

/// Runs the heartbeat loop for one secondary until `shutdown` is notified.
///
/// Probes `{endpoint}/health` every `heartbeat_interval`; a 200 response marks the secondary
/// `Healthy` and wakes every pipeline blocked on it. Anything else increments
/// `consecutive_failures` and reclassifies per the thresholds in `spec.md` §4.5.
pub async fn run_failure_detector(
    client: reqwest::Client,
    descriptor: Arc<SecondaryDescriptor>,
    heartbeat_interval: Duration,
    heartbeat_timeout: Duration,
    suspected_threshold: u32,
    unhealthy_threshold: u32,
) {
    loop {
        let url = format!("{}/health", descriptor.endpoint);
        let outcome = client.get(&url).timeout(heartbeat_timeout).send().await;

        match outcome {
            Ok(resp) if resp.status().is_success() => {
                let was_healthy = descriptor.health() == Health::Healthy;
                descriptor.consecutive_failures.store(0, Ordering::Release);
                descriptor.set_health(Health::Healthy);
                if !was_healthy {
                    info!("secondary {} is now Healthy", descriptor.endpoint);
                }
                // set-and-leave-set: always notify, even if already Healthy, so a pipeline that
                // raced the transition still observes it.
                descriptor.health_notify.notify_waiters();
            }
            other => {
                if let Err(e) = other {
                    debug!("heartbeat to {} failed: {}", descriptor.endpoint, e);
                }
                let failures = descriptor.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;
                let health = if failures >= unhealthy_threshold {
                    Health::Unhealthy
                } else if failures >= suspected_threshold {
                    Health::Suspected
                } else {
                    descriptor.health()
                };
                if health != descriptor.health() {
                    warn!(
                        "secondary {} reclassified {:?} after {} consecutive failed heartbeats",
                        descriptor.endpoint, health, failures
                    );
                }
                descriptor.set_health(health);
            }
        }

        tokio::time::sleep(heartbeat_interval).await;
    }
}
