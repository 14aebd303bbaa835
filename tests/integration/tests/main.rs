//! End-to-End Integration Tests
//!
//! These tests run the companion service against ephemeral PostgreSQL and
//! Redis containers, with sessions written exactly as the Identity Service
//! writes them.

mod common;
mod shared_session;
