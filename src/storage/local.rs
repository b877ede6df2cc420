//! Local filesystem backend for development
//!
//! Each bucket is a directory directly under the configured root, so
//! `<root>/acme-pilot/acme-raw-data/...` stands in for `s3://acme-pilot/acme-raw-data/...`.

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use object_store::local::LocalFileSystem;
use object_store::{ObjectMeta, ObjectStore};
use std::path::{Path as FsPath, PathBuf};
use std::time::Instant;

use crate::metrics;
use crate::storage::{to_path, StorageBackend};

/// Directory-per-bucket backend
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create a backend rooted at `root`, which must already exist
    pub fn new(root: &FsPath) -> Result<Self, object_store::Error> {
        let root = root.canonicalize().map_err(|e| object_store::Error::Generic {
            store: "LocalFileSystem",
            source: Box::new(e),
        })?;
        Ok(Self { root })
    }

    fn store(&self, bucket: &str) -> Result<LocalFileSystem, object_store::Error> {
        LocalFileSystem::new_with_prefix(self.root.join(bucket))
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectMeta>, object_store::Error> {
        let started = Instant::now();
        let result = match self.store(bucket) {
            Ok(store) => {
                let prefix = to_path(prefix);
                store.list(Some(&prefix)).try_collect::<Vec<_>>().await
            }
            Err(e) => Err(e),
        };
        metrics::observe_storage("list", started, &result);
        result
    }

    async fn head(&self, bucket: &str, key: &str) -> Result<ObjectMeta, object_store::Error> {
        let started = Instant::now();
        let result = match self.store(bucket) {
            Ok(store) => store.head(&to_path(key)).await,
            Err(e) => Err(e),
        };
        metrics::observe_storage("head", started, &result);
        result
    }
}
