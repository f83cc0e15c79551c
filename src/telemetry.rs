//! Tracing subscriber setup for the connector server.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Initializes structured logging: an env-filter (default `info`, overridable via
/// `RUST_LOG`) feeding a fmt layer. Called once from the binary before any request is
/// served.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
