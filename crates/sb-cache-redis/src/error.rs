//! Redis cache error conversion.

use sb_cache::CacheError;

/// Converts a `fred` Redis error to a `CacheError`.
#[allow(clippy::needless_pass_by_value)]
pub fn from_redis_error(err: fred::error::Error) -> CacheError {
    match err.kind() {
        fred::error::ErrorKind::IO
        | fred::error::ErrorKind::Canceled
        | fred::error::ErrorKind::Timeout => CacheError::Connection(err.to_string()),
        fred::error::ErrorKind::Config | fred::error::ErrorKind::Url => {
            CacheError::Configuration(err.to_string())
        }
        fred::error::ErrorKind::Parse => CacheError::Serialization(err.to_string()),
        _ => CacheError::Internal(err.to_string()),
    }
}
