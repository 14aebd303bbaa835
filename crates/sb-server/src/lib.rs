//! # sb-server
//!
//! Companion API service for Session Bridge.
//!
//! Recognizes users logged in through the Identity Service by resolving the
//! shared session cookie, and exposes:
//! - `GET /api/user` and `GET /api/session`
//! - health check endpoints for the session store and user directory
//!
//! ## Usage
//!
//! ```ignore
//! use sb_server::{Server, ServerConfig};
//!
//! let config = ServerConfig::from_env()?;
//! let server = Server::new(config).await?;
//! server.run().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use extract::{extract_session_id, SessionCookie};
pub use router::create_router;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use sb_cache_redis::RedisSessionStore;
use sb_storage_sql::PgUserDirectory;
use sqlx::PgPool;
use tokio::net::TcpListener;

/// The Session Bridge companion server.
pub struct Server {
    config: ServerConfig,
    state: AppState,
    pool: PgPool,
}

impl Server {
    /// Creates a new server instance.
    ///
    /// Connects to the session store and prepares a lazy database pool.
    /// Neither backend has to be reachable yet: the store keeps reconnecting
    /// and the pool opens connections on first use.
    ///
    /// # Errors
    ///
    /// Fails on invalid connection URLs or directory table name.
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let store = RedisSessionStore::connect(config.redis.clone()).await?;
        tracing::info!(
            key_prefix = %store.config().key_prefix,
            "Session store configured"
        );

        let pool = sb_storage_sql::create_pool(&config.pool_config())?;
        let directory = PgUserDirectory::new(
            pool.clone(),
            &config.directory_table,
            config.directory_query_timeout(),
        )?;
        tracing::info!(table = %config.directory_table, "Database connection pool created");

        let state = AppState::new(config.clone(), Arc::new(store), Arc::new(directory));

        Ok(Self {
            config,
            state,
            pool,
        })
    }

    /// Runs the server.
    ///
    /// This starts the HTTP server and blocks until it receives a shutdown signal.
    ///
    /// # Errors
    ///
    /// Fails if the listen address cannot be bound.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Binds the configured listen address.
    ///
    /// # Errors
    ///
    /// Fails if the address is invalid or already in use.
    pub async fn bind(&self) -> anyhow::Result<TcpListener> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        Ok(TcpListener::bind(addr).await?)
    }

    /// Serves requests on `listener` until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Fails if the server stops with an I/O error.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let app = create_router(self.state);

        tracing::info!("Server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        self.pool.close().await;
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Waits for a shutdown signal.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
