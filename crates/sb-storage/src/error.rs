//! Storage error types.

use thiserror::Error;

/// Errors that can occur during directory operations.
///
/// A missing user is not an error; lookups return `Ok(None)` for that.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Invalid data returned by or passed to the directory.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Database query error.
    #[error("Database query error: {0}")]
    Query(String),

    /// Query exceeded its time budget.
    #[error("Database query timed out")]
    Timeout,

    /// Invalid directory configuration.
    #[error("Invalid directory configuration: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Checks if the directory could not be reached at all.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_are_unavailable() {
        assert!(StorageError::Timeout.is_unavailable());
        assert!(StorageError::Connection("refused".to_string()).is_unavailable());
        assert!(!StorageError::Query("syntax".to_string()).is_unavailable());
    }

    #[test]
    fn error_display() {
        let err = StorageError::Configuration("bad table".to_string());
        assert!(err.to_string().contains("bad table"));
        assert_eq!(StorageError::Timeout.to_string(), "Database query timed out");
    }
}
