use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::http_server::requests::ValidationErrors;
use crate::ports::catalog::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Record not found.")]
    NotFound,
    #[error("The given data was invalid.")]
    Validation(ValidationErrors),
    #[error(transparent)]
    Json(#[from] JsonRejection),
    #[error("Server error: {0:?}")]
    Internal(color_eyre::Report),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

// An `{id}` segment that doesn't parse can't name a record either
impl From<PathRejection> for ApiError {
    fn from(_rejection: PathRejection) -> Self {
        Self::NotFound
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::MissingReferences { entity, ids } => {
                let mut errors = ValidationErrors::new();
                for id in ids {
                    errors.add("id", format!("The selected {entity} id {id} is invalid."));
                }
                Self::Validation(errors)
            }
            RepositoryError::Database(err) => {
                Self::Internal(color_eyre::Report::new(err).wrap_err("Database query failed"))
            }
        }
    }
}

// Tell axum how to convert `ApiError` into a response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();

        let (status, body) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "message": message })),
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "message": message, "errors": errors }),
            ),
            ApiError::Json(rejection) => (
                rejection.status(),
                json!({ "message": rejection.body_text() }),
            ),
            ApiError::Internal(report) => {
                tracing::error!("{report:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
