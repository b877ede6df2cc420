//! Media and model catalogs
//!
//! Read-only listings over the shared catalog buckets:
//! - rendered videos under `video/`
//! - test renders under `vis_test/`, paired with PDF evidence
//! - model artifacts and per-client analysis output

mod models;
mod videos;

pub use models::{model_options, ModelOptions, ModelQuery};
pub use videos::{list_test_videos, list_videos, TestVideoEntry, VideoEntry};

const VIDEO_EXTENSIONS: [&str; 4] = [".mp4", ".mov", ".avi", ".mkv"];

fn is_video(key: &str) -> bool {
    let lower = key.to_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
