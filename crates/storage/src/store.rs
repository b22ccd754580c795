use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::query::Query;

/// A folder collapsed out of a delimited listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Folder name relative to the listing prefix.
    pub name: String,
    /// Full prefix of the folder, ending with the delimiter.
    pub path: String,
}

/// One entry of a listing: either a stored object or a folder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub public_url: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(rename = "folders", skip_serializing_if = "Option::is_none", default)]
    pub folder: Option<Folder>,
}

impl FileInfo {
    /// Last path segment of the object.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

/// Pluggable file storage backend.
///
/// Implementors wrap a concrete blob store (cloud bucket, filesystem,
/// memory). Failures are reported as [`StorageError`]s naming the sentinel
/// they refine; callers classify them into faults.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store `data` under a generated name below `prefix` and return the
    /// object path.
    async fn upload(
        &self,
        prefix: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<String, StorageError>;

    /// Make the object at `path` publicly readable and return its URL.
    async fn get_url(&self, path: &str) -> Result<String, StorageError>;

    /// Delete the object at `path`.
    async fn remove(&self, path: &str) -> Result<(), StorageError>;

    /// List objects matching `query`.
    async fn list(&self, query: &Query) -> Result<Vec<FileInfo>, StorageError>;
}

/// Maximum object path length accepted by backends.
pub const MAX_PATH_LEN: usize = 1024;

/// Check `path` against the object naming rules shared by all backends.
pub fn verify_path(path: &str) -> Result<(), &'static str> {
    if path.is_empty()
        || path.len() > MAX_PATH_LEN
        || path.starts_with(".well-known/acme-challenge/")
        || path == "."
        || path == ".."
        || path.ends_with('/')
    {
        return Err("invalid path");
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || "_-.()$%& /".contains(c);
    if path.chars().all(allowed) {
        Ok(())
    } else {
        Err("invalid path")
    }
}
