//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;

/// Raw key/value backend underneath the content-addressed store.
///
/// Backends know nothing about hashing. They report a missing object as
/// `StorageError::NotFound` from `get`, and as `Ok(false)` from `exists`;
/// every other failure is a backend error that callers propagate as-is.
#[async_trait]
pub trait ObjectBackend: Send + Sync + 'static {
    /// Check if an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get an object's content.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Put an object, overwriting any existing value.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Get the name of this storage backend.
    ///
    /// Returns a static string identifier for the backend type (e.g., "s3", "memory").
    /// Used for metrics and logging.
    fn backend_name(&self) -> &'static str;
}
