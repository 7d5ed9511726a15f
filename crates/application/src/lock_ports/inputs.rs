use chrono::{DateTime, Utc};
use pit_domain::Lock;

/// Input payload for one acquire attempt.
///
/// Fields are unvalidated; the lock service rejects blank identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireLockInput {
    /// Resource to lock.
    pub lock_id: String,
    /// Requesting holder.
    pub owner: String,
    /// Optional lease length in seconds.
    pub expiry_in_sec: Option<i64>,
}

/// Input payload for releasing a batch of locks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLocksInput {
    /// Locks to release, in request order.
    pub lock_ids: Vec<String>,
    /// Holder performing the release.
    pub owner: String,
}

/// Input payload for extending a batch of leases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepAliveInput {
    /// Locks to extend, in request order.
    pub lock_ids: Vec<String>,
    /// Holder performing the extension.
    pub owner: String,
    /// Optional new lease length in seconds.
    pub expiry_in_sec: Option<i64>,
}

/// Outcome of one acquire attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockAcquisition {
    /// Requested resource.
    pub lock_id: String,
    /// Whether the requester now holds the lock.
    pub acquired: bool,
}

/// Read model of a live lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockMetadata {
    /// Guarded resource.
    pub lock_id: String,
    /// Current holder.
    pub owner: String,
    /// Start of the current holding period.
    pub created_at: DateTime<Utc>,
    /// End of the current lease.
    pub expires_at: DateTime<Utc>,
}

impl From<&Lock> for LockMetadata {
    fn from(lock: &Lock) -> Self {
        Self {
            lock_id: lock.lock_id().as_str().to_owned(),
            owner: lock.owner().as_str().to_owned(),
            created_at: lock.created_at(),
            expires_at: lock.expires_at(),
        }
    }
}
