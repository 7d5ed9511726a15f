//! Connection settings, pool construction and sqlx error classification.

use std::time::Duration;

use pit_core::{AppError, AppResult};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::info;

/// Connection target for the lock table database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Login role.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Server host name.
    pub host: String,
    /// Database name.
    pub database: String,
    /// Server port.
    pub port: u16,
}

impl DatabaseConfig {
    /// Reads `LOCK_DB_*` variables from the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads `LOCK_DB_*` variables through `lookup`, applying defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let port = match lookup("LOCK_DB_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid LOCK_DB_PORT: {error}")))?,
            None => 5432,
        };

        Ok(Self {
            user: lookup("LOCK_DB_USER").unwrap_or_else(|| "postgres".to_owned()),
            password: lookup("LOCK_DB_PASSWORD").unwrap_or_else(|| "postgres".to_owned()),
            host: lookup("LOCK_DB_HOST").unwrap_or_else(|| "localhost".to_owned()),
            database: lookup("LOCK_DB_NAME").unwrap_or_else(|| "lockmanager".to_owned()),
            port,
        })
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(self.host.as_str())
            .port(self.port)
            .username(self.user.as_str())
            .password(self.password.as_str())
            .database(self.database.as_str())
    }
}

/// Connection pool sizing and timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Upper bound of open connections.
    pub max_connections: u32,
    /// Connections kept open while idle.
    pub min_connections: u32,
    /// How long a caller waits for a connection before failing.
    pub connect_timeout: Duration,
    /// How long an unused connection stays open.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            connect_timeout: Duration::from_millis(5_000),
            idle_timeout: Duration::from_millis(30_000),
        }
    }
}

impl PoolConfig {
    /// Reads `LOCK_DB_POOL_*` and timeout variables from the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads pool variables through `lookup`, applying defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let defaults = Self::default();
        let max_connections = parse_u32(&lookup, "LOCK_DB_POOL_MAX", defaults.max_connections)?;
        let min_connections = parse_u32(&lookup, "LOCK_DB_POOL_MIN", defaults.min_connections)?;

        if max_connections == 0 {
            return Err(AppError::Validation(
                "LOCK_DB_POOL_MAX must be greater than zero".to_owned(),
            ));
        }

        if min_connections > max_connections {
            return Err(AppError::Validation(format!(
                "LOCK_DB_POOL_MIN ({min_connections}) must not exceed LOCK_DB_POOL_MAX ({max_connections})"
            )));
        }

        Ok(Self {
            max_connections,
            min_connections,
            connect_timeout: parse_millis(
                &lookup,
                "LOCK_DB_CONNECT_TIMEOUT_MS",
                defaults.connect_timeout,
            )?,
            idle_timeout: parse_millis(&lookup, "LOCK_DB_IDLE_TIMEOUT_MS", defaults.idle_timeout)?,
        })
    }
}

fn parse_u32(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u32,
) -> AppResult<u32> {
    lookup(name).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<u32>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
    })
}

fn parse_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: Duration,
) -> AppResult<Duration> {
    let Some(value) = lookup(name) else {
        return Ok(default);
    };

    let millis = value
        .trim()
        .parse::<u64>()
        .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))?;
    if millis == 0 {
        return Err(AppError::Validation(format!(
            "{name} must be greater than zero"
        )));
    }

    Ok(Duration::from_millis(millis))
}

/// Opens the pool and ensures the `locks` table exists.
pub async fn connect_and_migrate(
    database: &DatabaseConfig,
    pool: &PoolConfig,
) -> AppResult<PgPool> {
    let connection_pool = PgPoolOptions::new()
        .max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .acquire_timeout(pool.connect_timeout)
        .idle_timeout(pool.idle_timeout)
        .connect_with(database.connect_options())
        .await
        .map_err(|error| storage_error("connect to database", error))?;

    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    info!(
        host = %database.host,
        database = %database.database,
        max_connections = pool.max_connections,
        "lock database ready"
    );

    Ok(connection_pool)
}

/// Maps a sqlx failure to the application taxonomy.
///
/// Connectivity, pool exhaustion, timeouts and server-reported connection or
/// resource failures are retryable `Unavailable` errors; everything else is
/// `Internal`.
#[must_use]
pub fn storage_error(action: &str, error: sqlx::Error) -> AppError {
    let retryable = match &error {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => true,
        sqlx::Error::Database(db_error) => db_error
            .code()
            .is_some_and(|code| is_unavailable_sqlstate(&code)),
        _ => false,
    };

    if retryable {
        AppError::Unavailable(format!("failed to {action}: {error}"))
    } else {
        AppError::Internal(format!("failed to {action}: {error}"))
    }
}

/// SQLSTATE codes where the server could not serve the statement right now.
///
/// Class `08` is a connection exception, class `53` is insufficient
/// resources (`53300` too_many_connections), and `57P01`..`57P03` cover
/// administrator or crash shutdown and "cannot connect now".
fn is_unavailable_sqlstate(code: &str) -> bool {
    code.starts_with("08")
        || code.starts_with("53")
        || matches!(code, "57P01" | "57P02" | "57P03")
}
