//! # sb-session
//!
//! Cross-service session resolution for Session Bridge.
//!
//! The Identity Service logs users in and writes a serialized session record
//! into the shared store. This crate turns the opaque session identifier a
//! client presents into a [`UserIdentity`], without ever authenticating the
//! user itself:
//!
//! 1. fetch the raw record from a [`sb_cache::SessionStore`];
//! 2. decode it with a [`SessionCodec`] that matches the Identity Service's
//!    wire format and validates its shape;
//! 3. run the configured [`IdentityStrategy`] chain (directory lookup, then
//!    cached session fields) until one produces an identity.
//!
//! Every failure along the way is logged and downgraded to "anonymous"; see
//! [`SessionResolver`] for the exact policy.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod error;
pub mod id;
pub mod identity;
mod pickle_guard;
pub mod record;
pub mod resolver;
pub mod strategy;

pub use codec::{SessionCodec, SessionEncoding, DEFAULT_MAX_PAYLOAD_LEN};
pub use error::{DecodeError, SessionError, SessionResult};
pub use id::SessionId;
pub use identity::{Provenance, UserIdentity};
pub use record::{SensitiveFieldFilter, SessionRecord};
pub use resolver::SessionResolver;
pub use strategy::{DirectoryStrategy, IdentityStrategy, ResolutionContext, SessionCacheStrategy};
