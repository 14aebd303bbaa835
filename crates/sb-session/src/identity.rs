//! Resolved user identity.

use std::fmt;

use serde::Serialize;

use crate::id::SessionId;

/// Where the identity fields came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Read from the authoritative user directory.
    Directory,
    /// Taken from fields the Identity Service cached in the session.
    SessionCache,
}

impl Provenance {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::SessionCache => "session-cache",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user a session belongs to.
///
/// Built fresh on every resolution and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    /// Directory primary key.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Session the identity was resolved from.
    pub session_id: SessionId,
    /// Source of `username` and `email`.
    pub auth_backend: Provenance,
}
