use serde::Deserialize;

/// Storage backend configuration.
///
/// # Example
///
/// ```toml
/// [storage]
/// domain = "https://storage.example.com"
/// bucket = "media"
/// prefix_path = "uploads"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Base URL public object links are built from.
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Bucket objects are stored in.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Path every uploaded object is placed under.
    #[serde(default)]
    pub prefix_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            bucket: default_bucket(),
            prefix_path: String::new(),
        }
    }
}

fn default_domain() -> String {
    "http://localhost".to_owned()
}

fn default_bucket() -> String {
    "panicguard-file".to_owned()
}

impl StorageConfig {
    /// Public URL of the object at `path`.
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.domain.trim_end_matches('/'),
            self.bucket,
            path.trim_start_matches('/')
        )
    }
}
