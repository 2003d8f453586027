//! Content-addressed store over an [`ObjectBackend`].

use crate::backends::memory::MemoryBackend;
use crate::cache::ExistenceCache;
use crate::error::{StorageError, StorageResult};
use crate::metrics;
use crate::traits::ObjectBackend;
use bytes::Bytes;
use spindle_core::{Blob, ObjectId};
use std::sync::Arc;
use tracing::{Span, field, instrument};

/// Content-addressed object store.
///
/// Objects are keyed by the hex BLAKE2b-256 of their content. `store` skips
/// the upload when the object is already known (locally cached) or already
/// present in the backend; `get` verifies the fetched bytes against the
/// requested id before returning them.
///
/// A single instance is meant to be shared (`Arc<ContentStore>`) by all
/// concurrent callers so they share one existence cache.
pub struct ContentStore {
    backend: Arc<dyn ObjectBackend>,
    cache: ExistenceCache,
}

impl std::fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStore")
            .field("backend", &self.backend.backend_name())
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl ContentStore {
    /// Create a store over `backend` with an empty existence cache.
    pub fn new(backend: Arc<dyn ObjectBackend>) -> Self {
        metrics::register_metrics();
        Self {
            backend,
            cache: ExistenceCache::new(),
        }
    }

    /// Create a store backed by process memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn backend(&self) -> &Arc<dyn ObjectBackend> {
        &self.backend
    }

    pub fn cache(&self) -> &ExistenceCache {
        &self.cache
    }

    /// Store `content` and return its id.
    #[instrument(name = "store.put", skip_all, fields(
        backend = self.backend.backend_name(),
        object_id = field::Empty,
        exists = field::Empty,
        write_bytes = field::Empty,
    ))]
    pub async fn store(&self, content: impl Into<Bytes>) -> StorageResult<ObjectId> {
        let content = content.into();
        let id = ObjectId::compute(&content);
        let span = Span::current();
        span.record("object_id", field::display(&id));

        if self.cache.contains(&id) {
            metrics::CACHE_HITS.inc();
            return Ok(id);
        }

        let key = id.to_hex();
        if self.backend.exists(&key).await? {
            span.record("exists", true);
            metrics::EXISTING_OBJECTS.inc();
            self.cache.insert(id);
            return Ok(id);
        }

        span.record("write_bytes", content.len());
        let len = content.len() as u64;
        self.backend.put(&key, content).await?;

        metrics::UPLOADS.inc();
        metrics::BYTES_WRITTEN
            .with_label_values(&[self.backend.backend_name()])
            .inc_by(len);
        self.cache.insert(id);
        tracing::debug!(object_id = %id, bytes = len, "uploaded object");
        Ok(id)
    }

    /// Fetch the content stored under `id`, verifying its hash.
    #[instrument(name = "store.get", skip_all, fields(
        backend = self.backend.backend_name(),
        object_id = %id,
        read_bytes = field::Empty,
    ))]
    pub async fn get(&self, id: &ObjectId) -> StorageResult<Bytes> {
        let body = self.backend.get(&id.to_hex()).await?;

        let actual = ObjectId::compute(&body);
        if actual != *id {
            metrics::HASH_MISMATCHES.inc();
            tracing::warn!(expected = %id, actual = %actual, "fetched object failed integrity check");
            return Err(StorageError::HashMismatch {
                expected: id.to_hex(),
                actual: actual.to_hex(),
            });
        }
        self.cache.insert(*id);

        Span::current().record("read_bytes", body.len());
        metrics::BYTES_READ
            .with_label_values(&[self.backend.backend_name()])
            .inc_by(body.len() as u64);
        Ok(body)
    }

    /// Store `content` and return a blob reference to it.
    pub async fn put_blob(&self, content: impl Into<Bytes>) -> StorageResult<Blob> {
        self.store(content).await.map(Blob::new)
    }

    /// Read the content a blob refers to.
    pub async fn read_blob(&self, blob: &Blob) -> StorageResult<Bytes> {
        self.get(&blob.hash).await
    }
}
