pub mod games;
pub mod genres;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" })))
}
