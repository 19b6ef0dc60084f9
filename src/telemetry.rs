//! Logging setup for binaries and tests that embed the client.
//!
//! The library only emits `tracing` events and `metrics` samples. Installing a
//! subscriber or a metrics exporter is left to the embedding application; this
//! helper covers the common case of a formatted subscriber with an env filter.

use tracing_subscriber::EnvFilter;

use crate::{LiteError, Result};

/// Install a global fmt subscriber filtered by `filter` (e.g. `"lite_query=debug"`).
///
/// `RUST_LOG` takes precedence when it is set. Fails if a global subscriber is
/// already installed.
pub fn init_tracing(filter: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| LiteError::Config(format!("invalid log filter {filter}: {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|e| LiteError::Config(format!("cannot install tracing subscriber: {e}")))
}
