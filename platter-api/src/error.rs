use axum::{http::StatusCode, response::Json};
use serde_json::json;

use platter_core::Error as CoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Could not validate credentials")]
    Unauthorized,
    #[error("Not enough permissions")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Invalid(String),
    /// Detail is logged, never sent to the client.
    #[error("Internal server error")]
    Internal(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized => ApiError::Unauthorized,
            CoreError::Forbidden => ApiError::Forbidden,
            CoreError::NotFound(msg) => ApiError::NotFound(msg),
            CoreError::Conflict(msg) => ApiError::Conflict(msg),
            CoreError::Invalid(msg) => ApiError::Invalid(msg),
            CoreError::Internal(msg) => ApiError::Internal(msg),
            CoreError::Database(e) => ApiError::Internal(format!("Database error: {e}")),
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(detail) => {
                tracing::error!("{detail}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
