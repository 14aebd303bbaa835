//! Database entity types for `SQLx`.

use sb_storage::DirectoryUser;
use sqlx::FromRow;

/// Database row for directory users.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    /// Primary key, widened to `BIGINT` by the query.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Email address. NULL is allowed by some account tables.
    pub email: Option<String>,
}

impl From<UserRow> for DirectoryUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email.unwrap_or_default(),
        }
    }
}
