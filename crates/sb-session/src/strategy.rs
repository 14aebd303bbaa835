//! Identity strategies.
//!
//! A strategy turns an authenticated session into a [`UserIdentity`], or
//! returns `None` so the next strategy in the chain gets a turn.

use std::sync::Arc;

use async_trait::async_trait;
use sb_storage::UserDirectory;

use crate::id::SessionId;
use crate::identity::{Provenance, UserIdentity};
use crate::record::SessionRecord;

/// Inputs shared by every strategy in one resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    /// Session being resolved.
    pub session_id: &'a SessionId,
    /// Decoded record.
    pub record: &'a SessionRecord,
    /// Normalized authenticated user id.
    pub user_id: i64,
}

/// One step of the identity fallback chain.
#[async_trait]
pub trait IdentityStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Attempts to produce an identity. `None` means "try the next strategy".
    async fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<UserIdentity>;
}

/// Looks the user up in the authoritative directory.
pub struct DirectoryStrategy {
    directory: Arc<dyn UserDirectory>,
}

impl DirectoryStrategy {
    /// Creates a strategy backed by the given directory.
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl IdentityStrategy for DirectoryStrategy {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<UserIdentity> {
        match self.directory.find_by_id(ctx.user_id).await {
            Ok(Some(user)) => Some(UserIdentity {
                id: user.id,
                username: user.username,
                email: user.email,
                session_id: ctx.session_id.clone(),
                auth_backend: Provenance::Directory,
            }),
            Ok(None) => {
                tracing::warn!(
                    user_id = ctx.user_id,
                    session_id = %ctx.session_id,
                    "Session references a user missing from the directory"
                );
                None
            }
            Err(e) if e.is_unavailable() => {
                tracing::error!(
                    user_id = ctx.user_id,
                    error = %e,
                    "User directory unavailable"
                );
                None
            }
            Err(e) => {
                tracing::error!(
                    user_id = ctx.user_id,
                    error = %e,
                    "Directory lookup failed"
                );
                None
            }
        }
    }
}

/// Uses the username and email the Identity Service cached in the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCacheStrategy;

impl SessionCacheStrategy {
    /// Creates the strategy.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdentityStrategy for SessionCacheStrategy {
    fn name(&self) -> &'static str {
        "session-cache"
    }

    async fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<UserIdentity> {
        let username = ctx.record.cached_username()?;
        let email = ctx.record.cached_email()?;

        Some(UserIdentity {
            id: ctx.user_id,
            username: username.to_string(),
            email: email.to_string(),
            session_id: ctx.session_id.clone(),
            auth_backend: Provenance::SessionCache,
        })
    }
}
