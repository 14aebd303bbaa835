//! # sb-cache-redis
//!
//! Redis session store for Session Bridge.
//!
//! This crate reads session records written by the Identity Service using
//! the `fred` crate, implementing the [`sb_cache::SessionStore`] trait.
//!
//! ## Features
//!
//! - Multiplexed client with automatic reconnection
//! - Bounded command latency (`command_timeout_ms`)
//! - Key prefixing shared with the Identity Service (`shared_session:<id>`)
//! - Degraded start: an unreachable Redis does not prevent startup
//!
//! ## Example
//!
//! ```ignore
//! use sb_cache::SessionStore;
//! use sb_cache_redis::{RedisConfig, RedisSessionStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RedisConfig::default()
//!         .host("localhost")
//!         .port(6379);
//!
//!     let store = RedisSessionStore::connect(config).await?;
//!     let raw = store.get_session("abc123").await?;
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod store;

pub use config::RedisConfig;
pub use store::RedisSessionStore;
