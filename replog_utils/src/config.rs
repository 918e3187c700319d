//! Typed accessors for environment-variable configuration.
//!
//! Mirrors the `ini2var`/`env2var` split used elsewhere in this family of tools, minus the ini
//! layer: every setting this project cares about is read straight from the process environment.

use log::debug;
use std::env;
use std::fmt::Debug;
use std::str::FromStr;

/// Returns a required environment variable parsed into `T`.
///
/// # Panics
///
/// Panics with a descriptive message if the variable is unset or fails to parse. This is only
/// ever called during startup, never on a request path, so a panic is the right failure mode:
/// a misconfigured process should not come up at all.
pub fn env_var<T>(key: &str) -> T
where
    T: FromStr,
    <T as FromStr>::Err: Debug,
{
    let raw = env::var(key).unwrap_or_else(|_| panic!("missing required environment variable {key}"));
    let value = raw
        .parse()
        .unwrap_or_else(|e| panic!("cannot parse {key}={raw:?}: {e:?}"));
    debug!("{key} = {raw}");
    value
}

/// Returns an environment variable parsed into `T`, or `default` if unset.
pub fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    <T as FromStr>::Err: Debug,
{
    match env::var(key) {
        Ok(raw) if !raw.is_empty() => {
            let value = raw
                .parse()
                .unwrap_or_else(|e| panic!("cannot parse {key}={raw:?}: {e:?}"));
            debug!("{key} = {raw}");
            value
        }
        _ => default,
    }
}

/// Parses a comma-separated environment variable into a list, trimming whitespace and a trailing
/// slash from each entry (endpoints are typically base URLs).
pub fn env_var_list(key: &str) -> Vec<String> {
    let raw = env::var(key).unwrap_or_default();
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // std::env is process-global; serialize the tests that touch it.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn parses_required_value() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("REPLOG_TEST_PORT", "9090");
        let port: u16 = env_var("REPLOG_TEST_PORT");
        assert_eq!(port, 9090);
        env::remove_var("REPLOG_TEST_PORT");
    }

    #[test]
    fn falls_back_to_default_when_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var("REPLOG_TEST_MISSING");
        let value: u64 = env_var_or("REPLOG_TEST_MISSING", 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn splits_and_trims_endpoint_list() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("REPLOG_TEST_SECONDARIES", " http://a:8001/ ,http://b:8002, ,http://c:8003/");
        let list = env_var_list("REPLOG_TEST_SECONDARIES");
        assert_eq!(
            list,
            vec!["http://a:8001", "http://b:8002", "http://c:8003"]
        );
        env::remove_var("REPLOG_TEST_SECONDARIES");
    }

    #[test]
    fn empty_list_when_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var("REPLOG_TEST_SECONDARIES_MISSING");
        assert!(env_var_list("REPLOG_TEST_SECONDARIES_MISSING").is_empty());
    }
}
