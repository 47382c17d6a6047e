use std::fmt;
use tokio_postgres::error::SqlState;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types for persistence operations
#[derive(Debug)]
pub enum StoreError {
    /// Validation error - invalid input data
    ValidationError(String),

    /// Connection error - database unreachable or authentication failure
    ConnectionError(String),

    /// Not found error - the row doesn't exist or isn't visible to the caller
    NotFound(String),

    /// Conflict error - a unique constraint was violated
    Conflict(String),

    /// Database error - SQL errors, other constraint violations
    DatabaseError(String),

    /// Pool error - connection pool issues
    PoolError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            StoreError::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            StoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StoreError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            StoreError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            StoreError::PoolError(msg) => write!(f, "Pool error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Convert tokio-postgres errors to store errors
impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(db_error) = err.as_db_error() {
            let message = db_error.message();

            if *db_error.code() == SqlState::UNIQUE_VIOLATION {
                return StoreError::Conflict(message.to_string());
            }

            // e.g. a file attached to a project that does not exist
            if *db_error.code() == SqlState::FOREIGN_KEY_VIOLATION {
                return StoreError::ValidationError(message.to_string());
            }

            return StoreError::DatabaseError(format!("{}: {}", db_error.code().code(), message));
        }

        StoreError::DatabaseError(format!("{:?}", err))
    }
}

/// Convert deadpool errors to store errors
impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        StoreError::PoolError(err.to_string())
    }
}

/// Convert JSON errors to store errors
impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::ValidationError(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            StoreError::NotFound("Project not found".to_string()).to_string(),
            "Not found: Project not found"
        );
        assert_eq!(
            StoreError::Conflict("duplicate key".to_string()).to_string(),
            "Conflict: duplicate key"
        );
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(StoreError::from(err), StoreError::ValidationError(_)));
    }
}
