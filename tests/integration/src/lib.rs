//! Fixtures that play the Identity Service in end-to-end tests.
//!
//! The Identity Service owns both the account table and the session
//! records; the companion service only reads them. These helpers write both
//! in the same shape the Identity Service does.

use fred::prelude::*;
use sb_cache_redis::{RedisConfig, RedisSessionStore};
use sb_session::{SessionCodec, SessionRecord};
use sqlx::PgPool;

/// Account table as created by the Identity Service's migrations.
pub const AUTH_USER_DDL: &str = r"
    CREATE TABLE IF NOT EXISTS auth_user (
        id BIGSERIAL PRIMARY KEY,
        username VARCHAR(150) NOT NULL UNIQUE,
        email VARCHAR(254),
        password VARCHAR(128) NOT NULL DEFAULT '',
        is_active BOOLEAN NOT NULL DEFAULT TRUE
    )
";

/// Creates the account table.
pub async fn create_user_table(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(AUTH_USER_DDL).execute(pool).await?;
    Ok(())
}

/// Inserts an account and returns its id.
pub async fn insert_user(pool: &PgPool, username: &str, email: Option<&str>) -> anyhow::Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO auth_user (username, email) VALUES ($1, $2) RETURNING id",
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Deletes an account, leaving any of its sessions in place.
pub async fn delete_user(pool: &PgPool, id: i64) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM auth_user WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Writes and deletes session records the way the Identity Service does.
pub struct SessionWriter {
    store: RedisSessionStore,
    codec: SessionCodec,
}

impl SessionWriter {
    /// Connects to the shared store.
    pub async fn connect(config: RedisConfig, codec: SessionCodec) -> anyhow::Result<Self> {
        let store = RedisSessionStore::connect(config).await?;
        store.client().wait_for_connect().await?;
        Ok(Self { store, codec })
    }

    /// Stores `record` under `session_id`, replacing any previous record.
    pub async fn login(&self, session_id: &str, record: &SessionRecord) -> anyhow::Result<()> {
        let value = String::from_utf8(self.codec.encode(record)?)?;
        self.write_raw(session_id, value).await
    }

    /// Stores an arbitrary value under `session_id`.
    pub async fn write_raw(&self, session_id: &str, value: String) -> anyhow::Result<()> {
        let key = self.store.config().prefixed_key(session_id);
        self.store
            .client()
            .set::<(), _, _>(key, value, None, None, false)
            .await?;
        Ok(())
    }

    /// Removes the record, as logout does.
    pub async fn logout(&self, session_id: &str) -> anyhow::Result<()> {
        let key = self.store.config().prefixed_key(session_id);
        self.store.client().del::<i64, _>(key).await?;
        Ok(())
    }
}
