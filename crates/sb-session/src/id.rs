//! Session identifiers.

use std::fmt;

use serde::Serialize;

/// Longest identifier accepted from a cookie.
pub const MAX_SESSION_ID_LEN: usize = 256;

/// Opaque bearer token correlating a client with its session record.
///
/// The value is used verbatim as the store lookup key. `Debug` and
/// `Display` only show a short prefix so identifiers never end up whole in
/// logs; use [`SessionId::as_str`] for the raw value.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Parses a raw cookie value.
    ///
    /// Returns `None` for empty values, values longer than
    /// [`MAX_SESSION_ID_LEN`], and values containing whitespace or control
    /// characters.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_SESSION_ID_LEN
            && !raw.chars().any(|c| c.is_whitespace() || c.is_control());
        valid.then(|| Self(raw.to_string()))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a log-safe rendering: the first four characters followed by `***`.
    #[must_use]
    pub fn masked(&self) -> String {
        let prefix: String = self.0.chars().take(4).collect();
        format!("{prefix}***")
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionId").field(&self.masked()).finish()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_opaque_tokens() {
        let id = SessionId::parse("abc123").unwrap();
        assert_eq!(id.as_str(), "abc123");

        let id = SessionId::parse("x7k2m9p4q8w3e5r1t6y0u2i4o7p9a3s5").unwrap();
        assert_eq!(id.as_str().len(), 32);
    }

    #[test]
    fn parse_rejects_empty_and_malformed() {
        assert!(SessionId::parse("").is_none());
        assert!(SessionId::parse("abc 123").is_none());
        assert!(SessionId::parse("abc\n123").is_none());
        assert!(SessionId::parse(&"a".repeat(MAX_SESSION_ID_LEN + 1)).is_none());
        assert!(SessionId::parse(&"a".repeat(MAX_SESSION_ID_LEN)).is_some());
    }

    #[test]
    fn formatting_masks_the_token() {
        let id = SessionId::parse("abc123secret").unwrap();
        assert_eq!(id.to_string(), "abc1***");
        assert_eq!(format!("{id:?}"), "SessionId(\"abc1***\")");
        assert!(!format!("{id:?}").contains("secret"));
    }

    #[test]
    fn serializes_verbatim() {
        let id = SessionId::parse("abc123").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");
    }
}
