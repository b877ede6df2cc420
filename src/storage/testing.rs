//! In-memory storage double shared by scan and handler tests

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use object_store::path::Path;
use object_store::ObjectMeta;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use crate::identifier::SourceId;
use crate::storage::StorageBackend;

/// Buckets of `(key, size)` objects; listing is a plain string-prefix match
#[derive(Default)]
pub struct FakeStore {
    objects: BTreeMap<(String, String), usize>,
    unreachable: HashSet<String>,
    failing_prefixes: HashSet<String>,
    calls: Mutex<Vec<(&'static str, String, String)>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, bucket: &str, key: &str, size: usize) -> Self {
        self.objects
            .insert((bucket.to_string(), key.to_string()), size);
        self
    }

    /// One day of frames for `source`, split over two objects so sizes must be summed
    pub fn with_day(self, source: &SourceId, day: NaiveDate, size: u64) -> Self {
        let bucket = source.bucket();
        let prefix = source.day_prefix(day);
        let size = size as usize;
        self.with_object(&bucket, &format!("{prefix}0001.bin"), size / 2)
            .with_object(&bucket, &format!("{prefix}0002.bin"), size - size / 2)
    }

    /// Every call against `bucket` fails
    pub fn with_unreachable(mut self, bucket: &str) -> Self {
        self.unreachable.insert(bucket.to_string());
        self
    }

    /// Listing exactly `prefix` fails
    pub fn with_failing_prefix(mut self, prefix: &str) -> Self {
        self.failing_prefixes.insert(prefix.to_string());
        self
    }

    /// Number of storage calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// `(bucket, prefix)` of every listing, in call order
    pub fn list_calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _, _)| *op == "list")
            .map(|(_, bucket, prefix)| (bucket.clone(), prefix.clone()))
            .collect()
    }

    fn check(&self, op: &'static str, bucket: &str, target: &str) -> Result<(), object_store::Error> {
        self.calls
            .lock()
            .unwrap()
            .push((op, bucket.to_string(), target.to_string()));
        if self.unreachable.contains(bucket) || self.failing_prefixes.contains(target) {
            return Err(object_store::Error::Generic {
                store: "fake",
                source: format!("{bucket}/{target} unreachable").into(),
            });
        }
        Ok(())
    }

    fn meta(key: &str, size: usize) -> ObjectMeta {
        ObjectMeta {
            location: Path::from(key),
            last_modified: Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap(),
            size,
            e_tag: None,
            version: None,
        }
    }
}

#[async_trait]
impl StorageBackend for FakeStore {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectMeta>, object_store::Error> {
        self.check("list", bucket, prefix)?;
        Ok(self
            .objects
            .iter()
            .filter(|((b, key), _)| b == bucket && key.starts_with(prefix))
            .map(|((_, key), size)| Self::meta(key, *size))
            .collect())
    }

    async fn head(&self, bucket: &str, key: &str) -> Result<ObjectMeta, object_store::Error> {
        self.check("head", bucket, key)?;
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|size| Self::meta(key, *size))
            .ok_or_else(|| object_store::Error::NotFound {
                path: key.to_string(),
                source: "no such key".into(),
            })
    }
}
