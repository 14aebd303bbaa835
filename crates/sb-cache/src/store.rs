//! Session store trait.

use async_trait::async_trait;

use crate::error::CacheResult;

/// Read-only access to session records written by the Identity Service.
///
/// Implementations are responsible for key namespacing: callers pass the
/// bare session identifier and the store decides which key it maps to.
/// Entry lifetime (TTL) is owned by the writer, never by readers.
///
/// Implementations must be thread-safe, must not hold locks across I/O,
/// and must bound every call with their configured timeout.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Gets the raw serialized record for a session.
    ///
    /// Returns `Ok(None)` when no record exists (never created, expired, or
    /// removed on logout).
    async fn get_session(&self, session_id: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> CacheResult<()>;
}
