//! Process configuration, read once at startup from the environment (`spec.md` §6).

use replog_utils::config::{env_var, env_var_list, env_var_or};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct PrimaryConfig {
    pub port: u16,
    pub secondaries: Vec<String>,
    pub replication_timeout: Duration,
    pub heartbeat_interval: Duration,
    pub heartbeat_timeout: Duration,
    pub suspected_threshold: u32,
    pub unhealthy_threshold: u32,
}

impl PrimaryConfig {
    pub fn from_env() -> Self {
        PrimaryConfig {
            port: env_var("PORT"),
            secondaries: env_var_list("SECONDARIES"),
            replication_timeout: secs(env_var_or("REPLICATION_TIMEOUT", 30.0)),
            heartbeat_interval: secs(env_var_or("HEARTBEAT_INTERVAL", 2.0)),
            heartbeat_timeout: secs(env_var_or("HEARTBEAT_TIMEOUT", 1.0)),
            suspected_threshold: env_var_or("SUSPECTED_THRESHOLD", 2),
            unhealthy_threshold: env_var_or("UNHEALTHY_THRESHOLD", 5),
        }
    }

    /// Maximum valid `write_concern`: the primary plus every configured secondary.
    pub fn max_write_concern(&self) -> u32 {
        1 + self.secondaries.len() as u32
    }
}

#[derive(Clone, Debug)]
pub struct SecondaryConfig {
    pub port: u16,
    pub secondary_delay: Duration,
}

impl SecondaryConfig {
    pub fn from_env() -> Self {
        SecondaryConfig {
            port: env_var("PORT"),
            secondary_delay: secs(env_var_or("SECONDARY_DELAY", 0.0)),
        }
    }
}

fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value.max(0.0))
}
