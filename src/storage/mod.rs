//! Storage backend abstraction layer
//!
//! Provides a read-only interface over the object stores holding device
//! frames, media and model artifacts. Unlike a single-bucket client, every
//! call names its bucket: the availability scan resolves a different bucket
//! per tenant. Implementations delegate to object_store.

mod aws;
mod local;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use object_store::path::Path;
use object_store::ObjectMeta;
use std::sync::Arc;

use crate::config::{BackendType, Config};
use crate::errors::AppError;

pub use aws::AwsBackend;
pub use local::LocalBackend;

/// Storage backend trait for the listing and metadata calls the service needs
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// List every object under `prefix` in `bucket`
    ///
    /// A prefix with no objects yields an empty vector, not an error.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectMeta>, object_store::Error>;

    /// Get object metadata (HEAD operation)
    async fn head(&self, bucket: &str, key: &str) -> Result<ObjectMeta, object_store::Error>;
}

/// Create a storage backend based on configuration
pub fn create_backend(config: &Config) -> Result<Arc<dyn StorageBackend>, AppError> {
    match config.backend.backend_type {
        BackendType::Aws => Ok(Arc::new(AwsBackend::new(&config.backend)?)),
        BackendType::Local => {
            let root = config.backend.local_root.as_ref().ok_or_else(|| {
                AppError::Config("local backend requires a root directory".to_string())
            })?;
            Ok(Arc::new(LocalBackend::new(root)?))
        }
    }
}

/// Convert a `/`-delimited key or prefix into an object_store path
///
/// Empty segments (including a trailing `/`) are dropped.
pub(crate) fn to_path(key: &str) -> Path {
    Path::from_iter(key.split('/').filter(|part| !part.is_empty()))
}

/// Final segment of an object key
pub fn basename(location: &Path) -> &str {
    location.filename().unwrap_or_default()
}
