//! User directory trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;

/// A user account as stored by the Identity Service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// Primary key of the account.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Email address (empty when the account has none).
    pub email: String,
}

impl DirectoryUser {
    /// Creates a directory user.
    #[must_use]
    pub fn new(id: i64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }
}

/// Read-only access to the Identity Service's user accounts.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Gets a user by primary key.
    ///
    /// Returns `Ok(None)` when no such user exists.
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<DirectoryUser>>;

    /// Checks that the directory is reachable.
    async fn ping(&self) -> StorageResult<()>;
}
