//! # sb-storage-sql
//!
//! SQLx-based user directory for Session Bridge.
//!
//! This crate reads the Identity Service's account table from `PostgreSQL`
//! using `SQLx`. It never writes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod entities;
pub mod error;
pub mod pool;
pub mod user;

pub use pool::{create_pool, PoolConfig};
pub use user::{PgUserDirectory, DEFAULT_USERS_TABLE};
