//! Content-addressed object storage for Spindle.
//!
//! This crate provides:
//! - `ContentStore`: store/get by BLAKE2b-256 id with a per-instance
//!   existence cache and integrity verification on read
//! - `ObjectBackend`: the raw key/value capability underneath it
//! - Backends: S3-compatible and in-memory

pub mod backends;
pub mod cache;
pub mod error;
pub mod metrics;
pub mod store;
pub mod traits;

pub use backends::{memory::MemoryBackend, s3::S3Backend};
pub use cache::ExistenceCache;
pub use error::{StorageError, StorageResult};
pub use store::ContentStore;
pub use traits::ObjectBackend;

use spindle_core::config::{StoreAddress, StoreConfig};
use std::sync::Arc;

/// Create a content store from configuration.
///
/// The address scheme is validated here; an unrecognized scheme is a
/// configuration error even though no request has been made yet.
pub async fn from_config(config: &StoreConfig) -> StorageResult<ContentStore> {
    let address = config.validate().map_err(StorageError::Config)?;

    match address {
        StoreAddress::S3 { bucket, prefix } => {
            let backend = S3Backend::new(&bucket, prefix, config).await?;
            tracing::debug!(?backend, "initialized s3 backend");
            Ok(ContentStore::new(Arc::new(backend)))
        }
    }
}

/// Create a content store from a bare address using default settings.
pub async fn from_address(address: &str) -> StorageResult<ContentStore> {
    from_config(&StoreConfig::new(address)).await
}
