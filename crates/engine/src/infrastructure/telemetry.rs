//! Tracing subscriber setup for host applications.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "rolecast_engine=info";

/// Install a global fmt subscriber honouring `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::debug!("Tracing initialised");
    }
}
