//! # sb-storage
//!
//! User directory abstraction for Session Bridge.
//!
//! The user directory is the account table owned by the Identity Service.
//! The Companion API Service only ever reads single rows from it to confirm
//! or enrich an identity carried by a shared session.
//!
//! ## Provider Traits
//!
//! - [`UserDirectory`] - Read-only lookup of users by id
//!
//! ## Implementations
//!
//! - [`InMemoryUserDirectory`] - Process-local directory for development and tests
//! - `sb-storage-sql` - `PostgreSQL` implementation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod user;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryUserDirectory;
pub use user::{DirectoryUser, UserDirectory};
