//! Tracing setup for hosts that want log output.
//!
//! The library itself only emits events (`tracing::warn!` at every
//! degraded-but-continuing path); installing a subscriber is the host's
//! choice. `init` wires the conventional env-filtered fmt subscriber.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a global fmt subscriber filtered by `RUST_LOG` (default
/// `info`). Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
