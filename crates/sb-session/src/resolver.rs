//! Session resolution.

use std::sync::Arc;

use sb_cache::SessionStore;
use sb_storage::UserDirectory;

use crate::codec::SessionCodec;
use crate::error::{SessionError, SessionResult};
use crate::id::SessionId;
use crate::identity::UserIdentity;
use crate::record::SessionRecord;
use crate::strategy::{
    DirectoryStrategy, IdentityStrategy, ResolutionContext, SessionCacheStrategy,
};

/// Resolves session identifiers to user identities.
///
/// The resolver is read-only and keeps no state between calls, so one
/// instance is shared by every request. Infrastructure and data faults never
/// surface to callers of [`resolve`](Self::resolve): they are logged and the
/// caller is treated as anonymous. [`lookup`](Self::lookup) keeps them
/// distinguishable for code that needs to tell them apart.
#[derive(Clone)]
pub struct SessionResolver {
    store: Arc<dyn SessionStore>,
    codec: SessionCodec,
    strategies: Vec<Arc<dyn IdentityStrategy>>,
}

impl SessionResolver {
    /// Creates a resolver with an empty strategy chain.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, codec: SessionCodec) -> Self {
        Self {
            store,
            codec,
            strategies: Vec::new(),
        }
    }

    /// Creates a resolver with the standard chain: directory first, then
    /// fields cached in the session.
    #[must_use]
    pub fn standard(
        store: Arc<dyn SessionStore>,
        directory: Arc<dyn UserDirectory>,
        codec: SessionCodec,
    ) -> Self {
        Self::new(store, codec)
            .with_strategy(Arc::new(DirectoryStrategy::new(directory)))
            .with_strategy(Arc::new(SessionCacheStrategy::new()))
    }

    /// Appends a strategy to the end of the chain.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Arc<dyn IdentityStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Names of the configured strategies, in order.
    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Returns the codec used for stored records.
    #[must_use]
    pub const fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    /// Fetches and decodes a session record.
    ///
    /// Returns `Ok(None)` when the store has no entry for the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`](crate::SessionError::Store) when the
    /// store fails and [`SessionError::Decode`](crate::SessionError::Decode)
    /// when the entry is not a valid record.
    pub async fn lookup(&self, session_id: &SessionId) -> SessionResult<Option<SessionRecord>> {
        let Some(raw) = self.store.get_session(session_id.as_str()).await? else {
            return Ok(None);
        };
        Ok(Some(self.codec.decode(&raw)?))
    }

    /// Fetches and decodes a session record, logging and discarding faults.
    pub async fn load_record(&self, session_id: &SessionId) -> Option<SessionRecord> {
        match self.lookup(session_id).await {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                tracing::debug!(session_id = %session_id, "Session not found");
                None
            }
            Err(SessionError::Store(e)) if e.is_unavailable() => {
                tracing::error!(session_id = %session_id, error = %e, "Session store unavailable");
                None
            }
            Err(SessionError::Store(e)) => {
                tracing::error!(session_id = %session_id, error = %e, "Session store lookup failed");
                None
            }
            Err(SessionError::Decode(e)) => {
                tracing::error!(session_id = %session_id, error = %e, "Failed to decode session");
                None
            }
        }
    }

    /// Resolves an already loaded record to an identity.
    pub async fn resolve_record(
        &self,
        session_id: &SessionId,
        record: &SessionRecord,
    ) -> Option<UserIdentity> {
        let raw_id = record.authenticated_user_id()?;
        let Some(user_id) = record.user_id() else {
            tracing::warn!(
                session_id = %session_id,
                user_id = %raw_id,
                "Session has an unusable user id"
            );
            return None;
        };

        let ctx = ResolutionContext {
            session_id,
            record,
            user_id,
        };

        for strategy in &self.strategies {
            if let Some(identity) = strategy.resolve(&ctx).await {
                tracing::debug!(
                    user_id,
                    strategy = strategy.name(),
                    "Resolved session identity"
                );
                return Some(identity);
            }
        }

        tracing::debug!(
            user_id,
            session_id = %session_id,
            "Known user id but no identity source available"
        );
        None
    }

    /// Resolves an optional session identifier to an identity.
    ///
    /// An absent identifier is anonymous and never reaches the store.
    pub async fn resolve(&self, session_id: Option<&SessionId>) -> Option<UserIdentity> {
        let session_id = session_id?;
        let record = self.load_record(session_id).await?;
        self.resolve_record(session_id, &record).await
    }
}

impl std::fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResolver")
            .field("codec", &self.codec)
            .field("strategies", &self.strategy_names())
            .finish_non_exhaustive()
    }
}
