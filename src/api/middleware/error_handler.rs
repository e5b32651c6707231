//! Converts `AppError` into HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::dto::ErrorResponse;
use crate::error::AppError;

/// Maps an error to its HTTP status code.
///
/// - Validation, BadRequest → 400
/// - NotFound → 404
/// - Database, ConnectionPool, Timeout, Internal → 500
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Database { .. }
        | AppError::ConnectionPool { .. }
        | AppError::Timeout { .. }
        | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Builds the JSON body for an error.
///
/// Server-side failures carry the underlying message unchanged.
pub fn error_to_body(error: &AppError) -> ErrorResponse {
    match error {
        AppError::Validation { details } => {
            ErrorResponse::new("Validation failed").with_details(details.as_str())
        }
        AppError::BadRequest { message } => ErrorResponse::new(message.as_str()),
        AppError::NotFound { entity, .. } => ErrorResponse::new(format!("{} not found", entity)),
        AppError::Database { source, .. }
        | AppError::ConnectionPool { source }
        | AppError::Internal { source } => ErrorResponse::new(source.to_string()),
        AppError::Timeout { .. } => ErrorResponse::new(error.to_string()),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (error_to_status_code(&self), Json(error_to_body(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_to_status_code() {
        assert_eq!(
            error_to_status_code(&AppError::validation("name: too short")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_to_status_code(&AppError::bad_request("Invalid User ID")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_to_status_code(&AppError::not_found("User", "id", 1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_to_status_code(&AppError::timeout("get user")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            error_to_status_code(&AppError::ConnectionPool {
                source: anyhow::anyhow!("timed out waiting for connection"),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_response_body() {
        let response = AppError::validation("name: must be at least 3 characters long").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Validation failed", "details": "name: must be at least 3 characters long"})
        );
    }

    #[tokio::test]
    async fn test_not_found_response_body() {
        let response = AppError::not_found("User", "id", 42).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({"error": "User not found"}));
    }

    #[tokio::test]
    async fn test_database_error_message_is_propagated() {
        let response = AppError::Database {
            operation: "list users".to_string(),
            source: anyhow::anyhow!("relation \"users\" does not exist"),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "relation \"users\" does not exist"})
        );
    }
}
