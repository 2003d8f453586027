use async_trait::async_trait;
use bytes::Bytes;
use spindle_storage::{MemoryBackend, ObjectBackend, StorageError, StorageResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Per-operation call counters shared between a backend and the test.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub exists: AtomicUsize,
    pub get: AtomicUsize,
    pub put: AtomicUsize,
}

#[allow(dead_code)]
impl CallCounts {
    pub fn exists(&self) -> usize {
        self.exists.load(Ordering::SeqCst)
    }

    pub fn get(&self) -> usize {
        self.get.load(Ordering::SeqCst)
    }

    pub fn put(&self) -> usize {
        self.put.load(Ordering::SeqCst)
    }
}

/// In-memory backend that counts every call made to it.
#[allow(dead_code)]
pub struct InstrumentedBackend {
    inner: MemoryBackend,
    counts: Arc<CallCounts>,
}

#[allow(dead_code)]
impl InstrumentedBackend {
    pub fn new() -> (Arc<Self>, Arc<CallCounts>) {
        let counts = Arc::new(CallCounts::default());
        let backend = Arc::new(Self {
            inner: MemoryBackend::new(),
            counts: counts.clone(),
        });
        (backend, counts)
    }
}

#[async_trait]
impl ObjectBackend for InstrumentedBackend {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.counts.exists.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(key).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.counts.get.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        self.counts.put.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, data).await
    }

    fn backend_name(&self) -> &'static str {
        "instrumented"
    }
}

/// Backend whose every call fails with a transport-style error.
#[allow(dead_code)]
pub struct FailingBackend;

#[async_trait]
impl ObjectBackend for FailingBackend {
    async fn exists(&self, _key: &str) -> StorageResult<bool> {
        Err(StorageError::S3("connection refused".into()))
    }

    async fn get(&self, _key: &str) -> StorageResult<Bytes> {
        Err(StorageError::S3("connection refused".into()))
    }

    async fn put(&self, _key: &str, _data: Bytes) -> StorageResult<()> {
        Err(StorageError::S3("connection refused".into()))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
