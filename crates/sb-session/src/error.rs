//! Session error types.

use sb_cache::CacheError;
use thiserror::Error;

/// Errors raised while decoding a stored session record.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Stored record exceeds the accepted size.
    #[error("session payload is {len} bytes, limit is {max}")]
    TooLarge {
        /// Size of the stored record.
        len: usize,
        /// Configured limit.
        max: usize,
    },

    /// Outer base64 layer is malformed.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Pickle stream is malformed or references a Python class.
    #[error("invalid pickle payload: {0}")]
    Pickle(String),

    /// JSON payload is malformed.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Top-level value is not a mapping.
    #[error("session payload is a {0}, expected a mapping")]
    NotAMapping(&'static str),

    /// A mapping key is not a string.
    #[error("session payload has a non-string key")]
    NonStringKey,

    /// A value type outside the accepted schema.
    #[error("session payload contains unsupported value: {0}")]
    UnsupportedValue(&'static str),

    /// Nesting exceeds the accepted depth.
    #[error("session payload nested deeper than {0} levels")]
    TooDeep(usize),

    /// Record could not be encoded.
    #[error("failed to encode session record: {0}")]
    Encode(String),
}

/// Errors that can occur while loading a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The shared store failed or was unreachable.
    #[error("session store error: {0}")]
    Store(#[from] CacheError),

    /// The stored record could not be decoded.
    #[error("session decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl SessionError {
    /// Checks if this is a store (infrastructure) error.
    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Checks if this is a decode (data integrity) error.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
