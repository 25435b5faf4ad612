//! Log output setup

use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured log filter
pub const LOG_ENV: &str = "SETTINGSD_LOG";

/// Install a global `fmt` subscriber filtered by `SETTINGSD_LOG`, falling
/// back to `default_filter`
///
/// Returns `false` if a subscriber was already installed.
pub fn init_logging(default_filter: &str) -> bool {
	let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
	tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init().is_ok()
}

// vim: ts=4
