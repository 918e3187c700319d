//! C2: a single replicate RPC, with no side effects of its own. The pipeline (C3) owns retries.

use crate::entry::LogEntry;
use log::debug;
use reqwest::StatusCode;
use std::time::Duration;

/// The classified outcome of one `POST {endpoint}/replicate` attempt (`spec.md` §4.3).
#[derive(Debug)]
pub enum ReplicateOutcome {
    Success,
    /// 4xx other than 408/429. Should not occur in practice since the pipeline only ever sends
    /// well-formed bodies; reported upward so the pipeline can log it, but still retried.
    Permanent(StatusCode),
    /// Network error, timeout, 5xx, 408, or 429 — recovered internally via backoff.
    Transient(String),
}

pub async fn send(
    client: &reqwest::Client,
    endpoint: &str,
    entry: &LogEntry,
    timeout: Duration,
) -> ReplicateOutcome {
    let url = format!("{endpoint}/replicate");
    debug!("replicating entry {} to {}", entry.id, url);

    let result = client.post(&url).json(entry).timeout(timeout).send().await;

    match result {
        Ok(resp) => {
            let status = resp.status();
            if status.is_success() {
                ReplicateOutcome::Success
            } else if status == StatusCode::REQUEST_TIMEOUT
                || status == StatusCode::TOO_MANY_REQUESTS
                || status.is_server_error()
            {
                ReplicateOutcome::Transient(format!("http {status}"))
            } else if status.is_client_error() {
                ReplicateOutcome::Permanent(status)
            } else {
                ReplicateOutcome::Transient(format!("unexpected status {status}"))
            }
        }
        Err(e) => ReplicateOutcome::Transient(e.to_string()),
    }
}
