use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_path_to_error::Segment;

use crate::http_server::{error::ApiError, requests::ValidationErrors};

/// `axum::Json` with rejections rendered as [`ApiError`]. Syntax and content
/// type problems keep axum's status; a value of the wrong type is a
/// validation error keyed by its path in the body.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<serde_json::Value>::from_request(req, state).await?;

        serde_path_to_error::deserialize(value)
            .map(JsonBody)
            .map_err(|err| ApiError::Validation(type_mismatch(&err)))
    }
}

fn type_mismatch(err: &serde_path_to_error::Error<serde_json::Error>) -> ValidationErrors {
    let field = err
        .path()
        .iter()
        .map(|segment| match segment {
            Segment::Seq { index } => index.to_string(),
            Segment::Map { key } => key.clone(),
            Segment::Enum { variant } => variant.clone(),
            Segment::Unknown => "?".to_string(),
        })
        .collect::<Vec<_>>()
        .join(".");

    let field = if field.is_empty() { "body".to_string() } else { field };

    let mut errors = ValidationErrors::new();
    errors.add(field, err.inner().to_string());
    errors
}

/// The integer `{id}` segment of a record route. Anything unparsable is a 404.
#[derive(Debug, Deserialize, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct RecordId(pub i64);

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, StatusCode, header},
        routing::{get, post},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::http_server::requests::{StoreGameRequest, SyncRequest};

    async fn store(JsonBody(_request): JsonBody<StoreGameRequest>) -> StatusCode {
        StatusCode::CREATED
    }

    async fn sync(JsonBody(_request): JsonBody<SyncRequest>) -> StatusCode {
        StatusCode::OK
    }

    async fn show(RecordId(id): RecordId) -> String {
        id.to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/games", post(store))
            .route("/games/{game}", get(show))
            .route("/games/{game}/add-genres", post(sync))
    }

    async fn call(request: axum::http::Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn post_json(uri: &str, body: &str) -> (StatusCode, Value) {
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, bytes) = call(request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_keyed_validation_error() {
        let (status, body) = post_json("/games", r#"{"name": 123}"#).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "The given data was invalid.");
        let message = body["errors"]["name"][0].as_str().unwrap();
        assert!(message.contains("invalid type"));
        assert!(!message.contains("line"));
    }

    #[tokio::test]
    async fn test_wrong_item_type_is_keyed_by_index() {
        let (status, body) = post_json("/games/1/add-genres", r#"[{"id": 1}, {"id": "x"}]"#).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["1.id"].is_array());
        assert!(body["errors"].get("0.id").is_none());
    }

    #[tokio::test]
    async fn test_wrong_body_shape_is_keyed_as_body() {
        let (status, body) = post_json("/games/1/add-genres", r#"{"id": 1}"#).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["body"].is_array());
    }

    #[tokio::test]
    async fn test_syntax_error_keeps_bad_request() {
        let (status, bytes) = call(
            axum::http::Request::builder()
                .method(Method::POST)
                .uri("/games")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_missing_content_type_is_unsupported() {
        let (status, _) = call(
            axum::http::Request::builder()
                .method(Method::POST)
                .uri("/games")
                .body(Body::from(json!({ "name": "Doom" }).to_string()))
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_record_id_parses_integer_segment() {
        let (status, bytes) = call(
            axum::http::Request::builder()
                .uri("/games/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"42");
    }

    #[tokio::test]
    async fn test_record_id_non_integer_is_not_found() {
        let (status, bytes) = call(
            axum::http::Request::builder()
                .uri("/games/doom")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "message": "Record not found." }));
    }
}
