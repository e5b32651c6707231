use crate::error::AppError;
use diesel::result::Error as DieselError;

/// Converts Diesel errors into `AppError` variants.
///
/// `NotFound` keeps its own variant so callers can tell "no record" apart
/// from a failed query. Everything else becomes `AppError::Database`; for
/// server-side errors the source is the server's message, unchanged.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    ///
    /// # Arguments
    /// * `error` - The Diesel error to convert
    /// * `operation` - Description of the database operation that failed
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::NotFound => AppError::not_found("resource", "id", "unknown"),
            DieselError::DatabaseError(_, info) => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(info.message().to_string()),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorKind;

    struct MockDatabaseErrorInfo {
        message: String,
    }

    impl diesel::result::DatabaseErrorInformation for MockDatabaseErrorInfo {
        fn message(&self) -> &str {
            &self.message
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            None
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    #[test]
    fn test_convert_not_found_error() {
        let result = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "get user");
        assert!(matches!(result, AppError::NotFound { ref entity, .. } if entity == "resource"));
    }

    #[test]
    fn test_convert_not_null_violation_keeps_message() {
        let info = MockDatabaseErrorInfo {
            message: "null value in column \"dob\" violates not-null constraint".to_string(),
        };
        let error = DieselError::DatabaseError(DatabaseErrorKind::NotNullViolation, Box::new(info));

        match DatabaseErrorConverter::convert_diesel_error(error, "insert user") {
            AppError::Database { operation, source } => {
                assert_eq!(operation, "insert user");
                assert_eq!(
                    source.to_string(),
                    "null value in column \"dob\" violates not-null constraint"
                );
            }
            other => panic!("Expected Database error, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_closed_connection() {
        let info = MockDatabaseErrorInfo {
            message: "server closed the connection unexpectedly".to_string(),
        };
        let error = DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, Box::new(info));

        let result = DatabaseErrorConverter::convert_diesel_error(error, "list users");
        assert!(result.to_string().contains("server closed the connection unexpectedly"));
    }

    #[test]
    fn test_convert_other_errors() {
        let result =
            DatabaseErrorConverter::convert_diesel_error(DieselError::RollbackTransaction, "update user");
        assert!(matches!(result, AppError::Database { ref operation, .. } if operation == "update user"));
    }
}
