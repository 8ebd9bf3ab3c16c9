//! Tracing setup for the `septago` binary.
//!
//! Filter precedence: `RUST_LOG`, then the config file's `log_filter`, then
//! [`DEFAULT_FILTER`]. Output goes to stderr so command output on stdout
//! stays machine-readable.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_FILTER: &str = "info,septago_server=debug";

/// Chooses the filter directives.
pub fn build_filter(configured: Option<&str>) -> EnvFilter {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    choose_filter(from_env.as_deref(), configured)
}

/// First valid of `RUST_LOG`, the configured directives, the default.
fn choose_filter(from_env: Option<&str>, configured: Option<&str>) -> EnvFilter {
    [from_env, configured]
        .into_iter()
        .flatten()
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber.
pub fn init(configured: Option<&str>) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(build_filter(configured))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
