//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info,dashboard_stock=info,dashboard_web=info";

/// Initialize tracing subscriber with default configuration
///
/// Honors `RUST_LOG` and falls back to [`DEFAULT_LOG_FILTER`].
pub fn init_tracing() {
    init_tracing_with(DEFAULT_LOG_FILTER);
}

/// Initialize tracing subscriber with a custom fallback filter
///
/// Calling this twice is harmless: the second registration is ignored.
pub fn init_tracing_with(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}
