use serde::Deserialize;

/// Log output configuration.
///
/// # Example
///
/// ```toml
/// [logging]
/// system = "media-api"
/// level = "info,panicguard_server=debug"
/// format = "json"
/// ```
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Process-wide `system` field attached to every fault report.
    #[serde(default = "default_system")]
    pub system: String,
    /// Default filter directive, used when `RUST_LOG` is not set.
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format: `"pretty"` or `"json"`.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            system: default_system(),
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_system() -> String {
    "panicguard".to_owned()
}

fn default_level() -> String {
    "info".to_owned()
}

fn default_format() -> String {
    "pretty".to_owned()
}
