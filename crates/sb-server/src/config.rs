//! Server configuration.
//!
//! Configuration is loaded from environment variables with sensible defaults.

use std::time::Duration;

use sb_cache_redis::RedisConfig;
use anyhow::Context;
use sb_session::{SensitiveFieldFilter, SessionCodec, SessionEncoding, DEFAULT_MAX_PAYLOAD_LEN};
use sb_storage_sql::{PoolConfig, DEFAULT_USERS_TABLE};

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "shared_session_id";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host to bind to.
    pub host: String,

    /// Server port. `0` picks a free port.
    pub port: u16,

    /// Shared session store connection.
    pub redis: RedisConfig,

    /// Database connection URL.
    pub database_url: String,

    /// Minimum database connections.
    pub db_min_connections: u32,

    /// Maximum database connections.
    pub db_max_connections: u32,

    /// Database connect/acquire timeout in seconds.
    pub db_connect_timeout_secs: u64,

    /// Account table owned by the Identity Service.
    pub directory_table: String,

    /// Per-query timeout for directory lookups in milliseconds.
    pub directory_query_timeout_ms: u64,

    /// Name of the cookie carrying the session identifier.
    pub cookie_name: String,

    /// Wire format of stored sessions.
    pub session_encoding: SessionEncoding,

    /// Largest stored session record accepted, in bytes.
    pub session_max_bytes: usize,

    /// Session keys with these prefixes are never returned to clients.
    pub sensitive_prefixes: Vec<String>,

    /// CORS allowed origins (comma-separated). `*` allows any origin.
    pub cors_origins: Vec<String>,

    /// Log level.
    pub log_level: String,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Fails if `DATABASE_URL` is missing or a variable holds an invalid value.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let host = std::env::var("SB_HOST").unwrap_or(defaults.host);
        let port = env_parse("SB_PORT")?.unwrap_or(defaults.port);

        let mut redis = match std::env::var("REDIS_URL") {
            Ok(url) => RedisConfig::from_url(url),
            Err(_) => {
                let mut redis = RedisConfig::new()
                    .host(std::env::var("SB_REDIS_HOST").unwrap_or_else(|_| "localhost".into()))
                    .port(env_parse("SB_REDIS_PORT")?.unwrap_or(6379))
                    .database(env_parse("SB_REDIS_DB")?.unwrap_or(0));
                if let Ok(password) = std::env::var("SB_REDIS_PASSWORD") {
                    redis = redis.password(password);
                }
                redis
            }
        };
        if let Ok(prefix) = std::env::var("SB_REDIS_KEY_PREFIX") {
            redis = redis.key_prefix(prefix);
        }
        if let Some(timeout_ms) = env_parse("SB_REDIS_COMMAND_TIMEOUT_MS")? {
            redis = redis.command_timeout_ms(timeout_ms);
        }

        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            anyhow::anyhow!("DATABASE_URL environment variable is required")
        })?;

        let session_encoding = match std::env::var("SB_SESSION_ENCODING") {
            Ok(value) => value
                .parse::<SessionEncoding>()
                .map_err(|e| anyhow::anyhow!(e))?,
            Err(_) => SessionEncoding::default(),
        };

        let sensitive_prefixes = std::env::var("SB_SENSITIVE_PREFIXES")
            .map(|s| split_list(&s))
            .unwrap_or(defaults.sensitive_prefixes);

        let cors_origins = std::env::var("SB_CORS_ORIGINS")
            .map(|s| split_list(&s))
            .unwrap_or(defaults.cors_origins);

        Ok(Self {
            host,
            port,
            redis,
            database_url,
            db_min_connections: env_parse("SB_DB_MIN_CONNECTIONS")?
                .unwrap_or(defaults.db_min_connections),
            db_max_connections: env_parse("SB_DB_MAX_CONNECTIONS")?
                .unwrap_or(defaults.db_max_connections),
            db_connect_timeout_secs: env_parse("SB_DB_CONNECT_TIMEOUT_SECS")?
                .unwrap_or(defaults.db_connect_timeout_secs),
            directory_table: std::env::var("SB_DIRECTORY_TABLE")
                .unwrap_or(defaults.directory_table),
            directory_query_timeout_ms: env_parse("SB_DIRECTORY_QUERY_TIMEOUT_MS")?
                .unwrap_or(defaults.directory_query_timeout_ms),
            cookie_name: std::env::var("SB_COOKIE_NAME").unwrap_or(defaults.cookie_name),
            session_encoding,
            session_max_bytes: env_parse("SB_SESSION_MAX_BYTES")?
                .unwrap_or(defaults.session_max_bytes),
            sensitive_prefixes,
            cors_origins,
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
        })
    }

    /// Creates a configuration for testing.
    #[must_use]
    pub fn for_testing(database_url: &str, redis_url: &str) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port
            redis: RedisConfig::from_url(redis_url),
            database_url: database_url.to_string(),
            db_min_connections: 0,
            db_max_connections: 5,
            log_level: "debug".to_string(),
            ..Self::default()
        }
    }

    /// Returns the database pool configuration.
    #[must_use]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(&self.database_url)
            .max_connections(self.db_max_connections)
            .min_connections(self.db_min_connections)
            .connect_timeout(Duration::from_secs(self.db_connect_timeout_secs))
    }

    /// Returns the directory query timeout.
    #[must_use]
    pub const fn directory_query_timeout(&self) -> Duration {
        Duration::from_millis(self.directory_query_timeout_ms)
    }

    /// Returns the codec for stored session records.
    #[must_use]
    pub const fn session_codec(&self) -> SessionCodec {
        SessionCodec::new(self.session_encoding).with_max_payload_len(self.session_max_bytes)
    }

    /// Returns the sensitive field filter for session projections.
    #[must_use]
    pub fn sensitive_filter(&self) -> SensitiveFieldFilter {
        SensitiveFieldFilter::new(self.sensitive_prefixes.iter().cloned())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
            redis: RedisConfig::default(),
            database_url: "postgres://localhost/identity".to_string(),
            db_min_connections: 0,
            db_max_connections: 10,
            db_connect_timeout_secs: 5,
            directory_table: DEFAULT_USERS_TABLE.to_string(),
            directory_query_timeout_ms: 2000,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            session_encoding: SessionEncoding::default(),
            session_max_bytes: DEFAULT_MAX_PAYLOAD_LEN,
            sensitive_prefixes: SensitiveFieldFilter::default().prefixes().to_vec(),
            cors_origins: vec!["*".to_string()],
            log_level: "info".to_string(),
        }
    }
}

/// Reads an optional variable, failing if it is set but does not parse.
fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    std::env::var(key)
        .ok()
        .map(|value| parse_value(key, &value))
        .transpose()
}

fn parse_value<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{key} has invalid value '{value}'"))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
