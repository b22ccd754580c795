use thiserror::Error;

use panicguard_storage::StorageError;

/// Errors that can occur while starting or running the panicguard server.
///
/// Request-time failures never surface here; handlers raise a
/// [`panicguard_core::Fault`] and the recovery boundary answers for them.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configuration file is not valid TOML.
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// The log filter directive could not be parsed.
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage backend could not be initialized.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
