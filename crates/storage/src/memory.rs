use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use panicguard_core::Sentinel;

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::query::{Query, QueryField};
use crate::store::{FileInfo, FileStorage, Folder, verify_path};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    public: bool,
}

/// In-memory [`FileStorage`] backed by a [`DashMap`].
///
/// Objects live for the lifetime of the store. Clones share the same
/// objects.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    config: Arc<StorageConfig>,
    objects: Arc<DashMap<String, StoredObject>>,
}

impl MemoryStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config: Arc::new(config),
            objects: Arc::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Content of the object at `path`, if present.
    pub fn content(&self, path: &str) -> Option<Bytes> {
        self.objects.get(path).map(|o| o.data.clone())
    }

    /// Whether the object at `path` has been made public.
    pub fn is_public(&self, path: &str) -> bool {
        self.objects.get(path).is_some_and(|o| o.public)
    }
}

#[async_trait]
impl FileStorage for MemoryStorage {
    async fn upload(
        &self,
        prefix: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<String, StorageError> {
        let id = Uuid::new_v4().to_string();
        let path = join_path(&[&self.config.prefix_path, prefix, &id]);
        verify_path(&path).map_err(|e| StorageError::detailed(Sentinel::FileUpload, e))?;

        let now = Utc::now();
        debug!(path = %path, size = data.len(), "storing object");
        self.objects.insert(
            path.clone(),
            StoredObject {
                data,
                content_type: content_type.to_owned(),
                created: now,
                updated: now,
                public: false,
            },
        );
        Ok(path)
    }

    async fn get_url(&self, path: &str) -> Result<String, StorageError> {
        verify_path(path).map_err(|e| StorageError::detailed(Sentinel::FileUpdate, e))?;

        let mut object = self
            .objects
            .get_mut(path)
            .ok_or(StorageError::Sentinel(Sentinel::FileNotExist))?;
        object.public = true;
        object.updated = Utc::now();
        Ok(self.config.public_url(path))
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        verify_path(path).map_err(|e| StorageError::detailed(Sentinel::FileRemove, e))?;

        self.objects
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::detailed(Sentinel::FileRemove, "object doesn't exist"))
    }

    async fn list(&self, query: &Query) -> Result<Vec<FileInfo>, StorageError> {
        let listing = Listing::from_query(query)?;

        let mut objects: Vec<(String, StoredObject)> = self
            .objects
            .iter()
            .filter(|entry| listing.matches(entry.key()))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        objects.sort_by(|a, b| a.0.cmp(&b.0));

        let mut folders = BTreeSet::new();
        let mut entries = Vec::new();
        for (path, object) in objects {
            if let Some(folder) = listing.folder_of(&path) {
                if folders.insert(folder.path.clone()) {
                    entries.push(FileInfo {
                        folder: Some(folder),
                        ..FileInfo::default()
                    });
                }
                continue;
            }
            entries.push(FileInfo {
                public_url: self.config.public_url(&path),
                content_type: object.content_type,
                size: Some(object.data.len() as u64),
                created: Some(object.created),
                updated: Some(object.updated),
                path,
                folder: None,
            });
        }

        Ok(entries)
    }
}

/// Effective listing filter after applying every recorded clause.
#[derive(Debug, Default)]
struct Listing {
    delimiter: String,
    prefix: String,
    start_offset: String,
    end_offset: String,
}

impl Listing {
    fn from_query(query: &Query) -> Result<Self, StorageError> {
        let mut listing = Self::default();
        for field in &query.fields {
            match field {
                QueryField::Delimiter => {
                    require(&query.delimiter, "delimiter")?;
                    listing.delimiter.clone_from(&query.delimiter);
                    if !query.prefix.is_empty() {
                        listing.prefix = if query.prefix.ends_with('/') {
                            query.prefix.clone()
                        } else {
                            format!("{}/", query.prefix)
                        };
                    }
                }
                QueryField::Prefix => {
                    require(&query.prefix, "prefix")?;
                    if listing.prefix.is_empty() {
                        listing.prefix.clone_from(&query.prefix);
                    }
                }
                QueryField::StartOffset => {
                    require(&query.start_offset, "start_offset")?;
                    listing.start_offset.clone_from(&query.start_offset);
                }
                QueryField::EndOffset => {
                    require(&query.end_offset, "end_offset")?;
                    listing.end_offset.clone_from(&query.end_offset);
                }
                // No versioning or ACLs in memory.
                QueryField::Versions | QueryField::Projection => {}
            }
        }
        Ok(listing)
    }

    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
            && (self.start_offset.is_empty() || path >= self.start_offset.as_str())
            && (self.end_offset.is_empty() || path < self.end_offset.as_str())
    }

    fn folder_of(&self, path: &str) -> Option<Folder> {
        if self.delimiter.is_empty() {
            return None;
        }
        let rest = &path[self.prefix.len()..];
        let idx = rest.find(&self.delimiter)?;
        let name = rest[..idx].to_owned();
        let folder_path = format!("{}{}{}", self.prefix, name, self.delimiter);
        Some(Folder {
            name,
            path: folder_path,
        })
    }
}

fn require(value: &str, clause: &str) -> Result<(), StorageError> {
    if value.is_empty() {
        Err(StorageError::InvalidQuery(format!("{clause} is required")))
    } else {
        Ok(())
    }
}

fn join_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
