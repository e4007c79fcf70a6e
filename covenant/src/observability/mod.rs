//! Log subscriber setup.
//!
//! Covenant only emits `tracing` events: installation and skipping of
//! contracts at `debug`, stage progress at `trace`, and unmatched pattern
//! selectors at `warn`. These helpers install a subscriber for hosts that do
//! not bring their own.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable consulted before the fallback filter.
pub const LOG_ENV_VAR: &str = "COVENANT_LOG";

fn filter_or(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Installs a human-readable subscriber.
///
/// `COVENANT_LOG` wins over `filter` when set. Returns false if a global
/// subscriber was already installed.
pub fn init_tracing(filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter_or(filter))
        .try_init()
        .is_ok()
}

/// Installs a JSON subscriber, one object per event.
pub fn init_json_tracing(filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(fmt::layer().json().with_current_span(false))
        .with(filter_or(filter))
        .try_init()
        .is_ok()
}
