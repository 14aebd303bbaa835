//! SQL storage error conversion.

use sb_storage::StorageError;
use sqlx::Error as SqlxError;

/// Converts a `SQLx` error to a storage error.
#[allow(clippy::needless_pass_by_value)]
pub fn from_sqlx_error(err: SqlxError) -> StorageError {
    match err {
        SqlxError::Database(db_err) => StorageError::Query(db_err.to_string()),
        SqlxError::PoolTimedOut => StorageError::Connection("Connection pool timeout".to_string()),
        SqlxError::PoolClosed => StorageError::Connection("Connection pool closed".to_string()),
        SqlxError::Io(e) => StorageError::Connection(e.to_string()),
        SqlxError::Tls(e) => StorageError::Connection(e.to_string()),
        SqlxError::ColumnDecode { .. } | SqlxError::ColumnNotFound(_) | SqlxError::Decode(_) => {
            StorageError::InvalidData(err.to_string())
        }
        _ => StorageError::Internal(err.to_string()),
    }
}
