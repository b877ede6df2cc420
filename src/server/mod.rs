//! HTTP server implementation
//!
//! Sets up the Axum HTTP server with:
//! - Catalog API routes
//! - Middleware (CORS, tracing, request metrics, timeout, compression)
//! - Graceful shutdown

use axum::{
    extract::{MatchedPath, Request},
    http::{header, HeaderName, Method},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::Config;
use crate::metrics;
use crate::routes::{self, AppState};

/// HTTP server for the catalog API
pub struct Server {
    config: Config,
    state: AppState,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the Axum router with all middleware
    fn build_router(&self) -> Router {
        build_router(self.state.clone(), self.config.server.timeout_secs)
    }

    /// Start the server and run until shutdown signal
    pub async fn start<F>(&self, shutdown: F) -> std::io::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = self.build_router();

        let listener = tokio::net::TcpListener::bind(self.config.server.bind_address).await?;
        info!(address = %self.config.server.bind_address, "Server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

/// Every response allows any origin; browsers may send the `device` header
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("device")])
}

async fn record_request(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;
    metrics::observe_request(&route, response.status().as_u16());
    response
}

fn build_router(state: AppState, timeout_secs: u64) -> Router {
    routes::create_router(state)
        .route_layer(middleware::from_fn(record_request))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer())
                .layer(TimeoutLayer::new(Duration::from_secs(timeout_secs)))
                .layer(CompressionLayer::new())
                .into_inner(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::FakeStore;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router() -> Router {
        let storage = Arc::new(FakeStore::new());
        build_router(AppState::new(storage, Config::default()), 5)
    }

    #[tokio::test]
    async fn responses_allow_any_origin() {
        let response = router()
            .oneshot(
                HttpRequest::builder()
                    .uri("/dates?Device=acme_cam1")
                    .header(header::ORIGIN, "https://dashboard.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn client_errors_carry_cors_header() {
        let response = router()
            .oneshot(HttpRequest::builder().uri("/dates").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn preflight_allows_device_header() {
        let response = router()
            .oneshot(
                HttpRequest::builder()
                    .method(Method::OPTIONS)
                    .uri("/dates")
                    .header(header::ORIGIN, "https://dashboard.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "device")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let allowed = response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS]
            .to_str()
            .unwrap()
            .to_string();
        assert!(allowed.contains("device"));
    }

    #[tokio::test]
    async fn requests_are_counted_by_route() {
        let before = metrics::HTTP_REQUESTS
            .with_label_values(&["/healthz", "200"])
            .get();

        let response = router()
            .oneshot(HttpRequest::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert!(
            metrics::HTTP_REQUESTS
                .with_label_values(&["/healthz", "200"])
                .get()
                > before
        );
    }
}
