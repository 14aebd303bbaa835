//! # sb-cache
//!
//! Shared session store abstraction for Session Bridge.
//!
//! The Identity Service persists serialized session records in a fast
//! key-value store. This crate defines the narrow, read-only view the
//! Companion API Service has of that store. The production backend is
//! Redis (see `sb-cache-redis`).
//!
//! ## Store Providers
//!
//! - [`SessionStore`] - Fetch raw session bytes by session identifier
//! - [`InMemorySessionStore`] - Process-local store for development and tests
//!
//! ## Example
//!
//! ```ignore
//! use sb_cache::{CacheResult, SessionStore};
//!
//! async fn has_session(store: &dyn SessionStore, id: &str) -> CacheResult<bool> {
//!     Ok(store.get_session(id).await?.is_some())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod store;

pub use error::{CacheError, CacheResult};
pub use memory::InMemorySessionStore;
pub use store::SessionStore;
