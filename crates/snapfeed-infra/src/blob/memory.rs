//! In-memory blob storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use snapfeed_core::ports::{BlobStorage, StorageError, StoredRef};

const DEFAULT_BASE_URL: &str = "memory://blobs";

/// Blob storage keeping object bytes in a map; URLs are `{base_url}/{key}`.
pub struct InMemoryBlobStorage {
    objects: RwLock<HashMap<String, Vec<u8>>>,
    base_url: String,
}

impl InMemoryBlobStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("BLOB_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()))
    }

    /// Bytes stored under `key`, if any.
    pub async fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).cloned()
    }
}

impl Default for InMemoryBlobStorage {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn upload(&self, key: &str, blob: Vec<u8>) -> Result<StoredRef, StorageError> {
        if blob.is_empty() {
            return Err(StorageError::Upload(format!("{key}: empty blob")));
        }

        let size = blob.len();
        self.objects.write().await.insert(key.to_string(), blob);
        tracing::debug!(key = %key, size, "Blob stored");

        Ok(StoredRef {
            key: key.to_string(),
            size,
        })
    }

    async fn resolve_url(&self, stored: &StoredRef) -> Result<String, StorageError> {
        if !self.objects.read().await.contains_key(&stored.key) {
            return Err(StorageError::NotFound(stored.key.clone()));
        }

        Ok(format!("{}/{}", self.base_url, stored.key))
    }
}
