//! JSON tracing subscriber.
//!
//! The filter comes from `RUST_LOG`; when that is unset the plain
//! `LOG_LEVEL` variable (`debug`, `info`, ...) is used, then `info`.

use std::env;

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "info";

/// Filter directive for the given environment values.
pub fn directive(rust_log: Option<&str>, log_level: Option<&str>) -> String {
    [rust_log, log_level]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVE)
        .to_ascii_lowercase()
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init() {
    let rust_log = env::var("RUST_LOG").ok();
    let log_level = env::var("LOG_LEVEL").ok();
    let wanted = directive(rust_log.as_deref(), log_level.as_deref());
    let filter = EnvFilter::try_new(&wanted).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
