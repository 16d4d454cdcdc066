//! Logging bootstrap for tools built on these formats

use tracing_subscriber::EnvFilter;

use crate::settings::LoggingSettings;

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` wins when set; otherwise the configured level is used.
/// Calling this again once a subscriber is installed has no effect.
pub fn init(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already installed");
    }
}
