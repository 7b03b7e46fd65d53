//! Custom error types for the common library
//!
//! This module defines the database error type shared by every service and
//! every repository implementation.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify a query error, separating unique constraint violations from
    /// every other failure.
    pub fn from_query(err: SqlxError) -> Self {
        if let SqlxError::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return DatabaseError::UniqueViolation(constraint);
            }
        }

        DatabaseError::Query(err)
    }

    /// Whether the error was raised by a unique constraint
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation(_))
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_a_plain_query_error() {
        let err = DatabaseError::from_query(SqlxError::RowNotFound);
        assert!(matches!(err, DatabaseError::Query(SqlxError::RowNotFound)));
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn unique_violation_is_reported() {
        let err = DatabaseError::UniqueViolation("users_username_key".to_string());
        assert!(err.is_unique_violation());
        assert_eq!(
            err.to_string(),
            "Unique constraint violated: users_username_key"
        );
    }
}
