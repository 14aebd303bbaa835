//! # Session Bridge
//!
//! Main entry point for the companion API server.

#![forbid(unsafe_code)]

use sb_server::{Server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        cookie = %config.cookie_name,
        encoding = ?config.session_encoding,
        "Session Bridge starting"
    );

    Server::new(config).await?.run().await
}
