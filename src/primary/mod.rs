//! The primary node: owns the log, the ack tracker, one descriptor and pipeline per secondary,
//! and the failure detector tasks. `Replicator` is the single owned value everything hangs off
//! of, replacing the module-level mutable globals of the system this was modeled on.

pub mod ack;
pub mod health;
pub mod log;
pub mod pipeline;
pub mod quorum;
pub mod replication_client;
pub mod routes;

use crate::config::PrimaryConfig;
use crate::entry::LogEntry;
use crate::error::AppendError;
use ack::AckTracker;
use health::{run_failure_detector, Health, SecondaryDescriptor};
use log::PrimaryLog;
use quorum::has_quorum;
use replog_utils::time::now_unix_seconds;
use std::sync::Arc;

/// Owns everything the primary needs to serve writes and reads. Constructed once at startup;
/// handed to the router as shared state.
pub struct Replicator {
    config: PrimaryConfig,
    log: Arc<PrimaryLog>,
    ack_tracker: Arc<AckTracker>,
    descriptors: Vec<Arc<SecondaryDescriptor>>,
}

impl Replicator {
    /// Builds the replicator and spawns its background tasks: one heartbeat loop and one
    /// delivery pipeline per configured secondary (`spec.md` §3, components C3 and C5).
    pub fn spawn(config: PrimaryConfig) -> Arc<Self> {
        let client = reqwest::Client::new();
        let log = Arc::new(PrimaryLog::new());
        let ack_tracker = Arc::new(AckTracker::new());
        let descriptors: Vec<Arc<SecondaryDescriptor>> = config
            .secondaries
            .iter()
            .map(|endpoint| Arc::new(SecondaryDescriptor::new(endpoint.clone())))
            .collect();

        for descriptor in &descriptors {
            tokio::spawn(run_failure_detector(
                client.clone(),
                descriptor.clone(),
                config.heartbeat_interval,
                config.heartbeat_timeout,
                config.suspected_threshold,
                config.unhealthy_threshold,
            ));
            tokio::spawn(pipeline::run_pipeline(
                client.clone(),
                log.clone(),
                descriptor.clone(),
                ack_tracker.clone(),
                config.replication_timeout,
            ));
        }

        Arc::new(Replicator { config, log, ack_tracker, descriptors })
    }

    fn healthy_secondary_count(&self) -> usize {
        self.descriptors.iter().filter(|d| d.health() == Health::Healthy).count()
    }

    /// C6 + C7 + C4: checks quorum, validates the request, appends under the log's lock,
    /// registers the ack requirement, and — for `write_concern > 1` — blocks until satisfied.
    ///
    /// Quorum is checked first, ahead of input validation: `spec.md` §4.1 orders the gate before
    /// validation so a malformed request against a quorum-less cluster still fails with 503, not
    /// 400. `write_concern` defaults to 1 (ack from the primary alone).
    pub async fn handle_append(
        &self,
        message: Option<String>,
        write_concern: Option<u32>,
    ) -> Result<LogEntry, AppendError> {
        if !has_quorum(self.descriptors.len(), self.healthy_secondary_count()) {
            return Err(AppendError::NoQuorum);
        }

        let message = message.filter(|m| !m.is_empty()).ok_or(AppendError::MissingMessage)?;

        let write_concern = write_concern.unwrap_or(1);
        let max = self.config.max_write_concern();
        if write_concern < 1 || write_concern > max {
            return Err(AppendError::WriteConcernOutOfRange(write_concern, max));
        }

        let entry = self.log.append(message, now_unix_seconds());

        let required_acks = write_concern - 1;
        self.ack_tracker.register(entry.id, required_acks);

        if required_acks > 0 {
            // No timeout here: a write_concern>1 append blocks for as long as it takes
            // (`spec.md` §4.1 step v and its Open Question resolution in `DESIGN.md`).
            self.ack_tracker.wait_for(entry.id).await;
        }

        Ok(entry)
    }

    pub fn read_all(&self) -> Vec<LogEntry> {
        self.log.read_all()
    }

    /// A snapshot of each secondary's current health, keyed by endpoint, for the `/health` route.
    pub fn secondary_health(&self) -> Vec<(String, Health)> {
        self.descriptors.iter().map(|d| (d.endpoint.clone(), d.health())).collect()
    }
}
