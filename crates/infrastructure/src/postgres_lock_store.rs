//! PostgreSQL-backed lock store using the `locks` table.
//!
//! Each mutation is one conditional statement, so concurrent service
//! instances sharing the database never both win the same lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::debug;

use pit_application::{LeaseRenewal, LockLease, LockStore};
use pit_core::{AppError, AppResult};
use pit_domain::{Lock, LockId, LockOwner};

use crate::database::storage_error;

mod query_value;

use query_value::{QueryValue, bind_all};

const TRY_ACQUIRE_SQL: &str = r#"
    INSERT INTO locks (lock_id, owner, created_at, expires_at)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (lock_id) DO UPDATE
    SET
        owner = EXCLUDED.owner,
        created_at = EXCLUDED.created_at,
        expires_at = EXCLUDED.expires_at
    WHERE locks.expires_at <= $3
    RETURNING lock_id
"#;

const EXTEND_EXPIRY_SQL: &str = r#"
    UPDATE locks
    SET expires_at = GREATEST(expires_at, $4)
    WHERE lock_id = ANY($1) AND owner = $2 AND expires_at > $3
    RETURNING lock_id
"#;

const REMOVE_IF_OWNED_SQL: &str = r#"
    DELETE FROM locks
    WHERE lock_id = ANY($1) AND owner = $2
    RETURNING lock_id
"#;

const PURGE_EXPIRED_SQL: &str = r#"
    DELETE FROM locks
    WHERE expires_at < $1
"#;

/// PostgreSQL implementation of the lock store port.
#[derive(Clone)]
pub struct PostgresLockStore {
    pool: PgPool,
}

impl PostgresLockStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn execute(&self, action: &str, sql: &str, values: &[QueryValue]) -> AppResult<u64> {
        let result = bind_all(sqlx::query(sql), values)
            .execute(&self.pool)
            .await
            .map_err(|error| storage_error(action, error))?;

        Ok(result.rows_affected())
    }

    async fn fetch_lock_ids(
        &self,
        action: &str,
        sql: &str,
        values: &[QueryValue],
    ) -> AppResult<Vec<LockId>> {
        let rows = bind_all(sqlx::query(sql), values)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| storage_error(action, error))?;

        rows.iter()
            .map(|row| {
                let lock_id: String = row
                    .try_get("lock_id")
                    .map_err(|error| storage_error(action, error))?;
                LockId::new(lock_id).map_err(|error| {
                    AppError::Internal(format!("stored lock id is invalid: {error}"))
                })
            })
            .collect()
    }
}

#[async_trait]
impl LockStore for PostgresLockStore {
    async fn try_acquire(&self, lease: &LockLease) -> AppResult<bool> {
        let values = [
            QueryValue::from(lease.lock_id.as_str()),
            QueryValue::from(lease.owner.as_str()),
            QueryValue::from(lease.acquired_at),
            QueryValue::from(lease.expires_at),
        ];

        let row = bind_all(sqlx::query(TRY_ACQUIRE_SQL), &values)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| storage_error("acquire lock", error))?;

        Ok(row.is_some())
    }

    async fn extend_expiry(&self, renewal: &LeaseRenewal) -> AppResult<Vec<LockId>> {
        let values = [
            QueryValue::from(renewal.lock_ids.as_slice()),
            QueryValue::from(renewal.owner.as_str()),
            QueryValue::from(renewal.renewed_at),
            QueryValue::from(renewal.expires_at),
        ];

        self.fetch_lock_ids("extend lock expiry", EXTEND_EXPIRY_SQL, &values)
            .await
    }

    async fn remove_if_owned(
        &self,
        lock_ids: &[LockId],
        owner: &LockOwner,
    ) -> AppResult<Vec<LockId>> {
        let values = [QueryValue::from(lock_ids), QueryValue::from(owner.as_str())];

        self.fetch_lock_ids("release locks", REMOVE_IF_OWNED_SQL, &values)
            .await
    }

    async fn find(&self, lock_id: &LockId) -> AppResult<Option<Lock>> {
        let row = sqlx::query_as::<_, LockRow>(
            r#"
            SELECT lock_id, owner, created_at, expires_at
            FROM locks
            WHERE lock_id = $1
            "#,
        )
        .bind(lock_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| storage_error("load lock", error))?;

        row.map(Lock::try_from).transpose()
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let purged = self
            .execute(
                "purge expired locks",
                PURGE_EXPIRED_SQL,
                &[QueryValue::from(before)],
            )
            .await?;

        debug!(purged, %before, "purged expired lock rows");
        Ok(purged)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LockRow {
    lock_id: String,
    owner: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<LockRow> for Lock {
    type Error = AppError;

    fn try_from(row: LockRow) -> Result<Self, Self::Error> {
        let lock_id = LockId::new(row.lock_id)
            .map_err(|error| AppError::Internal(format!("stored lock id is invalid: {error}")))?;
        let owner = LockOwner::new(row.owner)
            .map_err(|error| AppError::Internal(format!("stored lock owner is invalid: {error}")))?;

        Ok(Lock::new(lock_id, owner, row.created_at, row.expires_at))
    }
}
