mod logging;
mod recovery;
mod server;


pub use logging::*;
pub use recovery::*;
pub use server::*;

pub use panicguard_storage::StorageConfig;

use std::path::Path;

use serde::Deserialize;

use crate::error::ServerError;

/// Top-level configuration for the panicguard server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct PanicguardConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Log output configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Recovery boundary labels.
    #[serde(default)]
    pub recovery: RecoveryConfig,
    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl PanicguardConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ServerError> {
        let config: Self = toml::from_str(contents)?;
        if !config.server.storage_route.starts_with('/') {
            return Err(ServerError::Config(format!(
                "server.storage_route must start with `/`, got `{}`",
                config.server.storage_route
            )));
        }
        Ok(config)
    }

    /// Load configuration from `path`, or use defaults if the file does not
    /// exist.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml(&contents)
        } else {
            Self::from_toml("")
        }
    }
}
