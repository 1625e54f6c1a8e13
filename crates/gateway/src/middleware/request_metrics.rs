//! Per-request metrics recording
//!
//! Emits `ecfr_requests_total` and `ecfr_request_duration_seconds` for
//! every request. The matched route template is used as the endpoint
//! label so path parameters do not explode label cardinality; requests
//! that miss the router (static files) fall back to the raw path.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use ecfr_common::metrics::RequestMetrics;

pub async fn track_requests(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let metrics = RequestMetrics::start(request.method().as_str(), &endpoint);
    let response = next.run(request).await;
    metrics.finish(response.status().as_u16());

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_track_requests_passes_response_through() {
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(axum::middleware::from_fn(track_requests));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/ping")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_track_requests_records_error_statuses() {
        let app = Router::new()
            .route("/boom", get(|| async { StatusCode::BAD_GATEWAY }))
            .layer(axum::middleware::from_fn(track_requests));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/boom")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
