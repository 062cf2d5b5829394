//! Blob storage port.

use async_trait::async_trait;

/// Handle to an uploaded object. Not yet a public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRef {
    pub key: String,
    pub size: usize,
}

/// Blob storage service - upload first, then resolve the durable URL.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store a blob under `key`.
    async fn upload(&self, key: &str, blob: Vec<u8>) -> Result<StoredRef, StorageError>;

    /// Resolve the retrieval URL of a stored object.
    async fn resolve_url(&self, stored: &StoredRef) -> Result<String, StorageError>;
}

/// Blob storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Connection failed: {0}")]
    Connection(String),
}
