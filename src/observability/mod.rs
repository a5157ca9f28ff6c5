//! Observability: structured logging initialization and metrics helpers.

pub mod metrics;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured default filter. Safe to
/// call once per process; a second call reports a configuration error.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let result = if config.json_logs {
        fmt().with_env_filter(filter).json().try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };

    result.map_err(|err| Error::config(format!("Failed to initialize tracing: {err}")))
}
