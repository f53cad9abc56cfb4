//! Structured logging initialization.
//!
//! The engine itself only emits `tracing` events; binaries embedding it call
//! [`init_logging`] once at startup. Log level is controlled via `RUST_LOG`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with an env-filter layer.
///
/// `default_filter` is used when `RUST_LOG` is not set, e.g.
/// `"wallet_engine=debug"`.
pub fn init_logging(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
