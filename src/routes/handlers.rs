//! Request handlers for the catalog API

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use prometheus::{Encoder, TextEncoder};
use tracing::{info, instrument};

use crate::catalog::{self, ModelOptions, ModelQuery, TestVideoEntry, VideoEntry};
use crate::errors::{AppError, Result};
use crate::identifier::SourceId;
use crate::routes::{AppState, DatesQuery};
use crate::scan;

/// Health check endpoint
#[instrument]
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness endpoint
#[instrument]
pub async fn ready() -> impl IntoResponse {
    (StatusCode::OK, "Ready")
}

/// Prometheus metrics endpoint
#[instrument]
pub async fn metrics() -> Result<String> {
    use crate::metrics::REGISTRY;
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| AppError::Internal(format!("Metrics are not UTF-8: {}", e)))
}

/// Availability scan - GET /dates?Device=...
#[instrument(skip(state))]
pub async fn available_dates(
    State(state): State<AppState>,
    Query(params): Query<DatesQuery>,
) -> Result<Json<Vec<String>>> {
    let raw = params
        .device
        .as_deref()
        .ok_or(AppError::MissingParameter("Device"))?;
    let source = SourceId::parse(raw)?;
    info!(source = %source, "Available dates request");

    let today = (state.today)();
    let dates = scan::find_recent_available_days(
        state.storage.as_ref(),
        &source,
        today,
        &state.config.scan,
    )
    .await?;

    Ok(Json(dates))
}

/// Video catalog - GET /videos
#[instrument(skip(state))]
pub async fn videos(State(state): State<AppState>) -> Result<Json<Vec<VideoEntry>>> {
    let (bucket, cdn_domain) = catalog_location(&state)?;
    let videos = catalog::list_videos(state.storage.as_ref(), bucket, cdn_domain).await?;
    Ok(Json(videos))
}

/// Test render catalog - GET /test-videos
#[instrument(skip(state))]
pub async fn test_videos(State(state): State<AppState>) -> Result<Json<Vec<TestVideoEntry>>> {
    let (bucket, cdn_domain) = catalog_location(&state)?;
    let videos = catalog::list_test_videos(state.storage.as_ref(), bucket, cdn_domain).await?;
    Ok(Json(videos))
}

/// Report options - GET /models?device_name=...&ClientNumber=...&Date=...
#[instrument(skip(state))]
pub async fn models(
    State(state): State<AppState>,
    Query(params): Query<ModelQuery>,
) -> Result<Json<ModelOptions>> {
    let options =
        catalog::model_options(state.storage.as_ref(), &state.config.catalog, &params).await?;
    Ok(Json(options))
}

fn catalog_location(state: &AppState) -> Result<(&str, &str)> {
    let catalog = &state.config.catalog;
    let bucket = catalog
        .bucket
        .as_deref()
        .ok_or_else(|| AppError::Config("catalog bucket is not configured".to_string()))?;
    let cdn_domain = catalog
        .cdn_domain
        .as_deref()
        .ok_or_else(|| AppError::Config("CDN domain is not configured".to_string()))?;
    Ok((bucket, cdn_domain))
}
