//! Tracing subscriber initialization and the process fault sink.
//!
//! Fault reports travel through [`tracing`] as `WARN` events carrying the
//! `system`, `kind`, `error` and `root` fields. This module installs the
//! subscriber that renders them and builds the [`TracingSink`] handed to the
//! recovery boundaries.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use panicguard_core::{FaultSink, TracingSink};

use crate::config::LoggingConfig;
use crate::error::ServerError;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. `config.format` selects
/// between human-readable output (`"pretty"`) and one JSON object per line
/// (`"json"`).
pub fn init(config: &LoggingConfig) -> Result<(), ServerError> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match config.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        "pretty" => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        other => {
            return Err(ServerError::Config(format!(
                "unknown log format `{other}`, expected `pretty` or `json`"
            )));
        }
    };

    installed.map_err(|e| ServerError::Config(format!("tracing already initialized: {e}")))
}

/// Build the sink the recovery boundaries report through, labelled with the
/// process-wide `system` name.
pub fn sink(config: &LoggingConfig) -> Arc<dyn FaultSink> {
    TracingSink::shared(config.system.clone())
}
