//! Redis session store implementation.

use std::future::Future;

use async_trait::async_trait;
use fred::prelude::*;
use sb_cache::{CacheError, CacheResult, SessionStore};

use crate::config::RedisConfig;
use crate::error::from_redis_error;

/// Redis-based session store.
///
/// Only issues single-key `GET`s (plus `PING` for health checks). The
/// Identity Service owns writes and expiry.
pub struct RedisSessionStore {
    client: Client,
    config: RedisConfig,
}

impl RedisSessionStore {
    /// Wraps an already-initialized client.
    #[must_use]
    pub const fn new(client: Client, config: RedisConfig) -> Self {
        Self { client, config }
    }

    /// Creates a client and starts connecting.
    ///
    /// Waits up to `connect_timeout_ms` for the first connection. An
    /// unreachable server is logged and tolerated: the client keeps
    /// reconnecting in the background and lookups fail with a connection
    /// error until it succeeds.
    ///
    /// ## Errors
    ///
    /// Returns an error if the connection URL is invalid.
    pub async fn connect(config: RedisConfig) -> CacheResult<Self> {
        let redis_config = Config::from_url(&config.connection_url())
            .map_err(|e| CacheError::Configuration(e.to_string()))?;

        let client = Client::new(
            redis_config,
            None,
            None,
            Some(ReconnectPolicy::new_exponential(0, 100, 30_000, 2)),
        );

        // The connection task lives as long as the client.
        let _connection = client.connect();

        match tokio::time::timeout(config.connect_timeout(), client.wait_for_connect()).await {
            Ok(Ok(())) => tracing::info!("Connected to session store"),
            Ok(Err(e)) => tracing::warn!("Session store connection failed, will retry: {}", e),
            Err(_) => tracing::warn!(
                timeout_ms = config.connect_timeout_ms,
                "Session store connection timed out, will retry"
            ),
        }

        Ok(Self::new(client, config))
    }

    /// Returns the underlying Redis client.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &RedisConfig {
        &self.config
    }

    /// Runs a command under the configured command timeout.
    async fn bounded<T, F>(&self, command: F) -> CacheResult<T>
    where
        F: Future<Output = Result<T, fred::error::Error>> + Send,
    {
        tokio::time::timeout(self.config.command_timeout(), command)
            .await
            .map_err(|_| CacheError::Timeout)?
            .map_err(from_redis_error)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get_session(&self, session_id: &str) -> CacheResult<Option<Vec<u8>>> {
        let key = self.config.prefixed_key(session_id);
        self.bounded(self.client.get::<Option<Vec<u8>>, _>(&key))
            .await
    }

    async fn ping(&self) -> CacheResult<()> {
        self.bounded(self.client.ping::<String>(None)).await?;
        Ok(())
    }
}
