//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed
    #[error("{0}. Check that your account has permission for this action")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    /// Request clashes with current state, e.g. buying a sold-out product
    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    InternalServerError,

    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Database details stay in the logs
        let error_message = match self {
            ApiError::Database(_) => "Database error".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// Log a repository failure and turn it into a 500
pub fn internal(context: &str) -> impl FnOnce(anyhow::Error) -> ApiError + '_ {
    move |e| {
        tracing::error!("{}: {}", context, e);
        ApiError::InternalServerError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(error: ApiError) -> (StatusCode, String) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, value["error"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_forbidden_carries_permission_hint() {
        let (status, message) =
            body_of(ApiError::Forbidden("Only the owner can edit this pet".to_string())).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(message.starts_with("Only the owner can edit this pet"));
        assert!(message.contains("permission"));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        assert_eq!(body_of(ApiError::NotFound("Pet")).await, (StatusCode::NOT_FOUND, "Pet not found".to_string()));
        assert_eq!(body_of(ApiError::Conflict("Sold out".to_string())).await.0, StatusCode::CONFLICT);
        assert_eq!(body_of(ApiError::BadRequest("Name is required".to_string())).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(body_of(ApiError::InternalServerError).await.0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
