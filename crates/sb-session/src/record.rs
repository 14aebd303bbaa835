//! Decoded session records and their caller-facing projection.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Key whose presence marks a session as logged in.
pub const AUTH_USER_ID_KEY: &str = "_auth_user_id";
/// Username cached in the session by the Identity Service at login.
pub const CACHED_USERNAME_KEY: &str = "_auth_user_username";
/// Email cached in the session by the Identity Service at login.
pub const CACHED_EMAIL_KEY: &str = "_auth_user_email";
/// Session authentication hash derived from the user's password hash.
pub const AUTH_HASH_KEY: &str = "_auth_user_hash";

/// Session state written by the Identity Service, after validation.
///
/// Values are restricted to JSON-compatible data; see
/// [`SessionCodec`](crate::SessionCodec) for how foreign payloads are checked
/// before they become a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SessionRecord {
    entries: BTreeMap<String, Value>,
}

impl SessionRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Gets a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Gets a string value by key. Non-string values yield `None`.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the record has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Whether the Identity Service marked this session as logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.entries.contains_key(AUTH_USER_ID_KEY)
    }

    /// Raw authenticated user id, in whatever form the Identity Service stored it.
    #[must_use]
    pub fn authenticated_user_id(&self) -> Option<&Value> {
        self.entries.get(AUTH_USER_ID_KEY)
    }

    /// Authenticated user id normalized to an integer.
    ///
    /// Accepts integers and decimal strings (`"1"`). Returns `None` when the
    /// key is absent or holds anything else.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        match self.authenticated_user_id()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Username cached at login, if present.
    #[must_use]
    pub fn cached_username(&self) -> Option<&str> {
        self.get_str(CACHED_USERNAME_KEY)
    }

    /// Email cached at login, if present.
    #[must_use]
    pub fn cached_email(&self) -> Option<&str> {
        self.get_str(CACHED_EMAIL_KEY)
    }

    /// Produces the caller-facing view, dropping sensitive keys.
    #[must_use]
    pub fn project(&self, filter: &SensitiveFieldFilter) -> BTreeMap<String, Value> {
        self.entries
            .iter()
            .filter(|(key, _)| !filter.is_sensitive(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl From<BTreeMap<String, Value>> for SessionRecord {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self { entries }
    }
}

/// Key prefixes that must never leave the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveFieldFilter {
    prefixes: Vec<String>,
}

impl SensitiveFieldFilter {
    /// Creates a filter from a list of prefixes. Empty prefixes are ignored.
    #[must_use]
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// Checks whether a key is hidden by this filter.
    #[must_use]
    pub fn is_sensitive(&self, key: &str) -> bool {
        self.prefixes.iter().any(|p| key.starts_with(p.as_str()))
    }

    /// Returns the configured prefixes.
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for SensitiveFieldFilter {
    fn default() -> Self {
        Self::new(["_password", AUTH_HASH_KEY])
    }
}
