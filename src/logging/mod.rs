//! Structured logging with tracing

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured directive. Safe to call
/// once per process; later calls return an error from the subscriber.
pub fn init_tracing(directive: &str, json: bool) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive));

    if json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json());
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer());
        tracing::subscriber::set_global_default(subscriber)
    }
}
