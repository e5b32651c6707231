use crate::error::DatabaseErrorConverter;
use thiserror::Error;

/// Application-wide error type crossing the handler, service and store layers.
///
/// Boundary rejections (`Validation`, `BadRequest`) carry the text sent to the
/// client. Store and infrastructure failures keep their source so the message
/// can be surfaced verbatim.
#[derive(Error, Debug)]
pub enum AppError {
    /// Field-level validation failure; `details` is a human readable summary
    #[error("Validation failed: {details}")]
    Validation { details: String },

    /// Malformed request (bad path parameter, unparsable body)
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Resource not found error with entity, field, and value information
    #[error("Resource not found: {entity} with {field}={value}")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// Database operation error with operation context
    #[error("Database operation failed: {operation}: {source}")]
    Database {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Could not check a connection out of the pool
    #[error("Connection pool error: {source}")]
    ConnectionPool {
        #[source]
        source: anyhow::Error,
    },

    /// A store operation exceeded its deadline
    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    /// Internal error for unexpected failures
    #[error("Internal error: {source}")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn validation(details: impl Into<String>) -> Self {
        AppError::Validation {
            details: details.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        AppError::NotFound {
            entity: entity.into(),
            field: field.into(),
            value: value.to_string(),
        }
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        AppError::Timeout {
            operation: operation.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(error: diesel::result::Error) -> Self {
        DatabaseErrorConverter::convert_diesel_error(error, "database operation")
    }
}

impl From<diesel_async::pooled_connection::bb8::RunError> for AppError {
    fn from(error: diesel_async::pooled_connection::bb8::RunError) -> Self {
        AppError::ConnectionPool {
            source: anyhow::Error::from(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
