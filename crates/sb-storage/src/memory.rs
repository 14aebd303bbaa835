//! In-memory user directory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::user::{DirectoryUser, UserDirectory};

/// In-memory user directory for development and testing.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<i64, DirectoryUser>>,
    offline: AtomicBool,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user.
    pub async fn insert(&self, user: DirectoryUser) {
        self.users.write().await.insert(user.id, user);
    }

    /// Simulates the database becoming unreachable (or reachable again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StorageError::Connection("directory offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<DirectoryUser>> {
        self.check_online()?;
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn ping(&self) -> StorageResult<()> {
        self.check_online()
    }
}
