// SPDX-License-Identifier: GPL-3.0-or-later

//! Custom Axum extractors that return JSON error responses.

use axum::Json;
use axum::extract::{FromRequest, Request};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

/// A wrapper around [`Json<T>`] that returns JSON error responses on rejection.
///
/// Axum's default `Json<T>` answers malformed bodies, unknown fields and a
/// missing content type with plain-text errors. This extractor turns those
/// rejections into `{"error": "..."}` with 400 Bad Request.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    fn from_request<'life0, 'async_trait>(
        req: Request,
        state: &'life0 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            match Json::<T>::from_request(req, state).await {
                Ok(Json(value)) => Ok(JsonBody(value)),
                Err(rejection) => Err(json_body_error(rejection)),
            }
        })
    }
}

fn json_body_error(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": rejection.body_text() })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::routing::post;
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Selection {
        address: String,
    }

    async fn echo_address(JsonBody(selection): JsonBody<Selection>) -> String {
        selection.address
    }

    async fn post_body(body: &str, content_type: Option<&str>) -> (StatusCode, String) {
        let app = Router::new().route("/select", post(echo_address));
        let mut request = axum::http::Request::builder().method("POST").uri("/select");
        if let Some(content_type) = content_type {
            request = request.header("content-type", content_type);
        }
        let response = app
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).to_string())
    }

    fn error_of(body: &str) -> String {
        let parsed: serde_json::Value = serde_json::from_str(body).unwrap();
        parsed["error"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn test_well_formed_body_reaches_handler() {
        let (status, body) = post_body(r#"{"address":"5Grw"}"#, Some("application/json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "5Grw");
    }

    #[tokio::test]
    async fn test_extra_field_is_rejected_as_json() {
        let body = r#"{"address":"5Grw","name":"x"}"#;
        let (status, body) = post_body(body, Some("application/json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error_of(&body).contains("unknown field"), "{body}");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let (status, body) = post_body(r#"{"address":"5Grw"}"#, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!error_of(&body).is_empty());
    }

    #[tokio::test]
    async fn test_truncated_json_is_bad_request() {
        let (status, body) = post_body(r#"{"address":"#, Some("application/json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!error_of(&body).is_empty());
    }
}
