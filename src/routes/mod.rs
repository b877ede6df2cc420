//! HTTP routes for the catalog API
//!
//! - GET /dates?Device=... - frame availability scan
//! - GET /videos - rendered video catalog
//! - GET /test-videos - test renders with evidence links
//! - GET /models?device_name=...&ClientNumber=...&Date=... - report options
//! - GET /healthz, /ready, /metrics - health, readiness and Prometheus exposition

mod handlers;

use axum::{routing::get, Router};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use crate::config::Config;
use crate::storage::StorageBackend;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageBackend>,
    pub config: Arc<Config>,
    /// Date the availability scan starts from
    pub today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(storage: Arc<dyn StorageBackend>, config: Config) -> Self {
        Self {
            storage,
            config: Arc::new(config),
            today: utc_today,
        }
    }

    /// Replace the clock used to pick the scan's starting day
    #[cfg(test)]
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Query parameters for the availability scan
#[derive(Debug, Default, serde::Deserialize)]
pub struct DatesQuery {
    #[serde(rename = "Device")]
    pub device: Option<String>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/metrics", get(handlers::metrics))
        .route("/dates", get(handlers::available_dates))
        .route("/videos", get(handlers::videos))
        .route("/test-videos", get(handlers::test_videos))
        .route("/models", get(handlers::models))
        .with_state(state)
}
