//! Store configuration loaded from environment variables.
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `TASKKEEPER_DATABASE_URL` | yes | |
//! | `TASKKEEPER_MAX_CONNECTIONS` | no | `10` |
//! | `TASKKEEPER_CONNECT_TIMEOUT_SECS` | no | `30` |

use crate::task::adapters::postgres::TaskPgPool;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_VAR: &str = "TASKKEEPER_DATABASE_URL";
/// Environment variable holding the pool size.
pub const MAX_CONNECTIONS_VAR: &str = "TASKKEEPER_MAX_CONNECTIONS";
/// Environment variable holding the connection checkout timeout in seconds.
pub const CONNECT_TIMEOUT_VAR: &str = "TASKKEEPER_CONNECT_TIMEOUT_SECS";

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Errors returned while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set or blank.
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    /// A variable holds a value that cannot be used.
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Raw value found.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Connection settings for the task store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// How long to wait for a pooled connection.
    pub connection_timeout: Duration,
}

impl StoreConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = read(DATABASE_URL_VAR).ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;

        let max_connections = match read(MAX_CONNECTIONS_VAR) {
            Some(raw) => parse_positive(MAX_CONNECTIONS_VAR, &raw)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let timeout_secs = match read(CONNECT_TIMEOUT_VAR) {
            Some(raw) => parse_positive(CONNECT_TIMEOUT_VAR, &raw)?,
            None => DEFAULT_CONNECT_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url: database_url.trim().to_owned(),
            max_connections,
            connection_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Builds a connection pool from these settings.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError`] when the initial connections cannot be opened.
    pub fn build_pool(&self) -> Result<TaskPgPool, PoolError> {
        let manager = ConnectionManager::<PgConnection>::new(&self.database_url);
        Pool::builder()
            .max_size(self.max_connections)
            .connection_timeout(self.connection_timeout)
            .build(manager)
    }
}

fn parse_positive<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let invalid = |reason| ConfigError::Invalid {
        key,
        value: raw.to_owned(),
        reason,
    };
    let value: T = raw
        .trim()
        .parse()
        .map_err(|_| invalid("expected a positive integer"))?;
    if value == T::default() {
        return Err(invalid("must be greater than zero"));
    }
    Ok(value)
}
