//! PIT expired lock sweeper.
//!
//! Expired rows are already free for new acquires; this process only keeps
//! the `locks` table from growing without bound.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use pit_application::{LockService, LockServiceConfig};
use pit_core::{AppError, AppResult};
use pit_infrastructure::{
    DatabaseConfig, PoolConfig, PostgresLockStore, SystemClock, connect_and_migrate,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct SweeperConfig {
    database: DatabaseConfig,
    pool: PoolConfig,
    interval: Duration,
    grace: chrono::Duration,
}

impl SweeperConfig {
    fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let interval_ms = parse_u64(&lookup, "SWEEPER_INTERVAL_MS", 60_000)?;
        if interval_ms == 0 {
            return Err(AppError::Validation(
                "SWEEPER_INTERVAL_MS must be greater than zero".to_owned(),
            ));
        }

        let grace_seconds = parse_u64(&lookup, "SWEEPER_GRACE_SECONDS", 3_600)?;
        let grace_seconds = i64::try_from(grace_seconds).map_err(|error| {
            AppError::Validation(format!("invalid SWEEPER_GRACE_SECONDS: {error}"))
        })?;
        let grace = chrono::Duration::try_seconds(grace_seconds).ok_or_else(|| {
            AppError::Validation("SWEEPER_GRACE_SECONDS is out of range".to_owned())
        })?;

        Ok(Self {
            database: DatabaseConfig::from_lookup(&lookup)?,
            pool: PoolConfig::from_lookup(&lookup)?,
            interval: Duration::from_millis(interval_ms),
            grace,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = SweeperConfig::load()?;
    let pool = connect_and_migrate(&config.database, &config.pool).await?;
    let lock_service = LockService::new(
        Arc::new(PostgresLockStore::new(pool)),
        Arc::new(SystemClock::new()),
        LockServiceConfig::default(),
    );

    info!(
        interval = ?config.interval,
        grace_seconds = config.grace.num_seconds(),
        "pit-lock-sweeper started"
    );

    loop {
        match lock_service.purge_expired(config.grace).await {
            Ok(purged) => debug!(purged, "sweep pass finished"),
            Err(error) => warn!(
                error = %error,
                retryable = error.is_retryable(),
                "failed to sweep expired locks"
            ),
        }

        tokio::time::sleep(config.interval).await;
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> AppResult<u64> {
    lookup(name).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<u64>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
    })
}
