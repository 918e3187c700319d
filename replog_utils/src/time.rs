//! Wall-clock helpers. The replicated log timestamps entries with seconds since the epoch, the
//! same unit the original Python prototype got from `time.time()`.

use chrono::Utc;

/// Current wall-clock time as fractional seconds since the Unix epoch.
pub fn now_unix_seconds() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_nanos()) / 1_000_000_000.0
}
