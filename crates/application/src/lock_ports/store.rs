use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pit_core::AppResult;
use pit_domain::{Lock, LockId, LockOwner};

/// Lease requested by one acquire attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockLease {
    /// Resource to lock.
    pub lock_id: LockId,
    /// Requesting holder.
    pub owner: LockOwner,
    /// Request instant. Stored rows expiring at or before it are free.
    pub acquired_at: DateTime<Utc>,
    /// End of the requested lease.
    pub expires_at: DateTime<Utc>,
}

/// Lease extension requested by one keep-alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseRenewal {
    /// Locks to extend.
    pub lock_ids: Vec<LockId>,
    /// Holder that must own the live row.
    pub owner: LockOwner,
    /// Request instant. Rows expiring at or before it are not extended.
    pub renewed_at: DateTime<Utc>,
    /// Requested end of the lease. A later stored expiry is kept.
    pub expires_at: DateTime<Utc>,
}

/// Persistence port for lock rows.
///
/// Every mutating method must be a single atomic conditional write in the
/// backing store. Service instances share the store and hold no locks of
/// their own.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Inserts the lease when `lock_id` is absent, or overwrites the stored
    /// row when it expired at or before `lease.acquired_at`.
    ///
    /// Returns true when `lease.owner` is now the holder.
    async fn try_acquire(&self, lease: &LockLease) -> AppResult<bool>;

    /// Sets `expires_at` of every live row in `renewal.lock_ids` owned by
    /// `renewal.owner` to the later of its current value and
    /// `renewal.expires_at`.
    ///
    /// Returns the ids of the rows that matched, in no particular order.
    /// Absent, expired and foreign rows are skipped.
    async fn extend_expiry(&self, renewal: &LeaseRenewal) -> AppResult<Vec<LockId>>;

    /// Deletes every row in `lock_ids` owned by `owner`.
    ///
    /// Returns the ids of the deleted rows, in no particular order.
    async fn remove_if_owned(
        &self,
        lock_ids: &[LockId],
        owner: &LockOwner,
    ) -> AppResult<Vec<LockId>>;

    /// Returns the stored row, live or not.
    async fn find(&self, lock_id: &LockId) -> AppResult<Option<Lock>>;

    /// Deletes rows that expired before `before` and returns how many.
    async fn purge_expired(&self, before: DateTime<Utc>) -> AppResult<u64>;
}
