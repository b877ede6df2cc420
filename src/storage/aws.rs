//! AWS S3 storage backend implementation
//!
//! Uses object_store::aws::AmazonS3. Credentials come from the default AWS
//! chain read by `AmazonS3Builder::from_env`:
//! - Environment variables (AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY)
//! - Web identity / IRSA role
//! - ECS task role and EC2 instance metadata
//!
//! A store is bound to one bucket, so one client is built lazily per bucket
//! and reused for later calls.

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::{ObjectMeta, ObjectStore};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::debug;

use crate::config::BackendConfig;
use crate::metrics;
use crate::storage::{to_path, StorageBackend};

/// AWS S3 storage backend
pub struct AwsBackend {
    builder: AmazonS3Builder,
    stores: RwLock<HashMap<String, Arc<AmazonS3>>>,
}

impl AwsBackend {
    /// Create a new AWS S3 backend from the default credential chain
    pub fn new(config: &BackendConfig) -> Result<Self, object_store::Error> {
        Ok(Self::with_builder(AmazonS3Builder::from_env(), config))
    }

    /// Create a backend from an explicit builder, applying region and endpoint
    pub fn with_builder(builder: AmazonS3Builder, config: &BackendConfig) -> Self {
        let mut builder = builder.with_region(&config.region);

        // Configure endpoint (for S3-compatible services like MinIO)
        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }

        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        Self {
            builder,
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// Client for `bucket`, built on first use
    fn store(&self, bucket: &str) -> Result<Arc<AmazonS3>, object_store::Error> {
        if let Some(store) = self.read_stores().get(bucket) {
            return Ok(store.clone());
        }

        debug!(bucket, "Building S3 client");
        let store = Arc::new(self.builder.clone().with_bucket_name(bucket).build()?);
        self.write_stores()
            .entry(bucket.to_string())
            .or_insert_with(|| store.clone());
        Ok(store)
    }

    fn read_stores(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<AmazonS3>>> {
        self.stores.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_stores(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<AmazonS3>>> {
        self.stores.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StorageBackend for AwsBackend {
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
