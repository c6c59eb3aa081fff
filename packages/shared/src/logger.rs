//! Tracing subscriber setup shared by all binaries.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// # Arguments
///
/// * `bin_name` - Binary name used as the default filter target
/// * `default_level` - Level applied when `RUST_LOG` is not set (e.g. "debug")
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let default_directive = format!("{}={}", bin_name.replace('-', "_"), default_level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
