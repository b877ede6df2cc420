//! Rendered video listings
//!
//! File names follow `<client>_<device...>_<date>_<suffix>.<ext>`; test
//! renders omit the separate client segment from the device name and may
//! carry a matching PDF under `pdf_evidance/`.

use object_store::ObjectMeta;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

use crate::catalog::is_video;
use crate::errors::Result;
use crate::storage::{basename, StorageBackend};

const VIDEO_PREFIX: &str = "video/";
const TEST_PREFIX: &str = "vis_test/";
const EVIDENCE_PREFIX: &str = "pdf_evidance/";
const UNANNOTATED_SUFFIX: &str = "unannotated.mp4";

/// A rendered video published through the CDN
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoEntry {
    pub client: String,
    #[serde(rename = "deviceName")]
    pub device_name: String,
    pub date: String,
    pub name: String,
    pub url: String,
    pub last_modified: String,
    pub size: usize,
}

/// A test render, with its evidence report when one exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestVideoEntry {
    #[serde(flatten)]
    pub video: VideoEntry,
    pub pdf_url: Option<String>,
}

/// Videos under `video/` in the catalog bucket
#[instrument(skip(storage))]
pub async fn list_videos(
    storage: &dyn StorageBackend,
    bucket: &str,
    cdn_domain: &str,
) -> Result<Vec<VideoEntry>> {
    let objects = storage.list(bucket, VIDEO_PREFIX).await?;

    let mut videos = Vec::new();
    for meta in objects.iter().filter(|m| is_video(m.location.as_ref())) {
        let key = relative_key(meta, VIDEO_PREFIX);
        let parts: Vec<&str> = key.split('_').collect();

        // `<client>_<device>_<date>_unannotated.mp4` carries one more trailing segment
        let tail = if parts.contains(&UNANNOTATED_SUFFIX) { 3 } else { 2 };
        let Some(date_idx) = parts.len().checked_sub(tail) else {
            warn!(key = %meta.location, "Skipping video with unexpected name");
            continue;
        };

        videos.push(VideoEntry {
            client: parts[0].to_string(),
            device_name: parts.get(1..date_idx).unwrap_or_default().join("_"),
            date: parts[date_idx].to_string(),
            name: basename(&meta.location).to_string(),
            url: format!("https://{cdn_domain}/{VIDEO_PREFIX}{key}"),
            last_modified: meta.last_modified.to_rfc3339(),
            size: meta.size,
        });
    }

    info!(count = videos.len(), "Listed videos");
    Ok(videos)
}

/// Test renders under `vis_test/`, each linked to `pdf_evidance/<stem>.pdf` if present
#[instrument(skip(storage))]
pub async fn list_test_videos(
    storage: &dyn StorageBackend,
    bucket: &str,
    cdn_domain: &str,
) -> Result<Vec<TestVideoEntry>> {
    let objects = storage.list(bucket, TEST_PREFIX).await?;
    let evidence: HashSet<String> = storage
        .list(bucket, EVIDENCE_PREFIX)
        .await?
        .iter()
        .map(|meta| relative_key(meta, EVIDENCE_PREFIX).to_string())
        .collect();

    let mut videos = Vec::new();
    for meta in objects.iter().filter(|m| is_video(m.location.as_ref())) {
        let key = relative_key(meta, TEST_PREFIX);
        let parts: Vec<&str> = key.split('_').collect();

        let Some(date_idx) = parts.len().checked_sub(2) else {
            warn!(key = %meta.location, "Skipping test video with unexpected name");
            continue;
        };

        let stem = key.split('.').next().unwrap_or(key);
        let pdf = format!("{stem}.pdf");
        let pdf_url = evidence
            .contains(&pdf)
            .then(|| format!("https://{cdn_domain}/{EVIDENCE_PREFIX}{pdf}"));

        videos.push(TestVideoEntry {
            video: VideoEntry {
                client: parts[0].to_string(),
                device_name: parts[..date_idx].join("_"),
                date: parts[date_idx].to_string(),
                name: basename(&meta.location).to_string(),
                url: format!("https://{cdn_domain}/{TEST_PREFIX}{key}"),
                last_modified: meta.last_modified.to_rfc3339(),
                size: meta.size,
            },
            pdf_url,
        });
    }

    info!(count = videos.len(), evidence = evidence.len(), "Listed test videos");
    Ok(videos)
}

fn relative_key<'a>(meta: &'a ObjectMeta, prefix: &str) -> &'a str {
    let key: &str = meta.location.as_ref();
    key.strip_prefix(prefix).unwrap_or(key)
}
