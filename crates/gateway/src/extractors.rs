//! Request extractors
//!
//! `AppJson` mirrors `axum::Json` but converts body rejections into the
//! service's `AppError` envelope, so malformed request bodies produce
//! the same `{ "error": { code, message } }` shape as every other 4xx.

use axum::extract::{FromRequest, Request};
use axum::Json;
use ecfr_common::errors::AppError;

pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::InvalidFormat {
                message: rejection.body_text(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::post,
        Router,
    };
    use tower::ServiceExt;

    async fn echo(AppJson(value): AppJson<serde_json::Value>) -> Json<serde_json::Value> {
        Json(value)
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let app = Router::new().route("/echo", post(echo));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INVALID_FORMAT");
        assert!(body["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn test_valid_body_passes_through() {
        let app = Router::new().route("/echo", post(echo));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"slug": "epa"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
