//! Application state management.
//!
//! This module defines the shared state that is passed to all request handlers.

use std::sync::Arc;

use sb_cache::SessionStore;
use sb_session::{SensitiveFieldFilter, SessionResolver};
use sb_storage::UserDirectory;

use crate::config::ServerConfig;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Session resolver.
    pub resolver: SessionResolver,

    /// Shared session store, kept for health checks.
    pub store: Arc<dyn SessionStore>,

    /// User directory, kept for health checks.
    pub directory: Arc<dyn UserDirectory>,

    /// Filter applied to session data returned to clients.
    pub filter: Arc<SensitiveFieldFilter>,
}

impl AppState {
    /// Creates a new application state with the standard resolver chain.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn SessionStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        let resolver = SessionResolver::standard(
            store.clone(),
            directory.clone(),
            config.session_codec(),
        );
        let filter = Arc::new(config.sensitive_filter());

        Self {
            config: Arc::new(config),
            resolver,
            store,
            directory,
            filter,
        }
    }

    /// Returns the session cookie name.
    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
