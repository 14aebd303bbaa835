//! In-memory session store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{CacheError, CacheResult};
use crate::store::SessionStore;

/// In-memory session store for development and testing.
///
/// Plays the part of the shared store inside a single process. The
/// `insert`/`remove` methods stand in for the Identity Service, which is the
/// only writer in a real deployment.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Vec<u8>>>,
    lookups: AtomicUsize,
    offline: AtomicBool,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw session bytes under a session identifier.
    pub async fn insert(&self, session_id: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.sessions
            .write()
            .await
            .insert(session_id.into(), data.into());
    }

    /// Removes a session, as the Identity Service does on logout.
    pub async fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// Simulates the backend becoming unreachable (or reachable again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of `get_session` calls served so far.
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> CacheResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(CacheError::Connection("store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_session(&self, session_id: &str) -> CacheResult<Option<Vec<u8>>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn ping(&self) -> CacheResult<()> {
        self.check_online()
    }
}
