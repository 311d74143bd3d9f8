/*!
 * Persistence of translated documents.
 *
 * `BlobStore` is the write-once object interface the controller hands the
 * final document to. `LocalBlobStore` keeps objects as files in a directory,
 * optionally published under a base URL.
 */

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use log::info;
use serde::Serialize;

use crate::app_config::StorageConfig;
use crate::errors::StorageError;
use crate::file_utils::FileManager;

/// A stored object and where it can be retrieved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredObject {
    pub key: String,
    pub location: String,
}

/// Write-once object storage
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, body: &str, content_type: &str) -> Result<StoredObject, StorageError>;
}

/// Object key for a document stored now
pub fn object_key(config: &StorageConfig) -> String {
    FileManager::timestamped_name(&config.key_prefix, &config.extension, Utc::now())
}

/// Blob store backed by a local directory
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    dir: PathBuf,
    public_base_url: Option<String>,
}

impl LocalBlobStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.filter(|url| !url.trim().is_empty()),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.output_dir, config.public_base_url.clone())
    }

    fn location_of(&self, key: &str, path: &std::path::Path) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => path.display().to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, body: &str, content_type: &str) -> Result<StoredObject, StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::Write {
                key: key.to_string(),
                message: "invalid object key".to_string(),
            });
        }

        FileManager::ensure_dir(&self.dir)
            .map_err(|e| StorageError::Unavailable(format!("{:#}", e)))?;

        let path = self.dir.join(key);
        tokio::fs::write(&path, body).await.map_err(|e| StorageError::Write {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        let location = self.location_of(key, &path);
        info!("Stored {} ({}, {} bytes) at {}", key, content_type, body.len(), location);

        Ok(StoredObject {
            key: key.to_string(),
            location,
        })
    }
}
