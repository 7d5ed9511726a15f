use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use pit_application::{LeaseRenewal, LockLease, LockStore};
use pit_core::AppResult;
use pit_domain::{Lock, LockId, LockOwner};

/// In-memory lock store for tests and single-instance deployments.
///
/// The mutex is held across every check-and-write, which gives the same
/// atomicity as the conditional statements of the PostgreSQL store.
#[derive(Default)]
pub struct InMemoryLockStore {
    locks: Mutex<HashMap<LockId, Lock>>,
}

impl InMemoryLockStore {
    /// Creates an empty in-memory lock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LockStore for InMemoryLockStore {
    async fn try_acquire(&self, lease: &LockLease) -> AppResult<bool> {
        let mut locks = self.locks.lock().await;
        if locks
            .get(&lease.lock_id)
            .is_some_and(|lock| lock.is_live_at(lease.acquired_at))
        {
            return Ok(false);
        }

        locks.insert(
            lease.lock_id.clone(),
            Lock::new(
                lease.lock_id.clone(),
                lease.owner.clone(),
                lease.acquired_at,
                lease.expires_at,
            ),
        );
        Ok(true)
    }

    async fn extend_expiry(&self, renewal: &LeaseRenewal) -> AppResult<Vec<LockId>> {
        let mut locks = self.locks.lock().await;
        let mut extended = Vec::new();
        for lock_id in &renewal.lock_ids {
            let Some(lock) = locks.get_mut(lock_id) else {
                continue;
            };
            if !lock.is_held_by(&renewal.owner, renewal.renewed_at) {
                continue;
            }

            *lock = Lock::new(
                lock.lock_id().clone(),
                lock.owner().clone(),
                lock.created_at(),
                lock.expires_at().max(renewal.expires_at),
            );
            extended.push(lock_id.clone());
        }

        Ok(extended)
    }

    async fn remove_if_owned(
        &self,
        lock_ids: &[LockId],
        owner: &LockOwner,
    ) -> AppResult<Vec<LockId>> {
        let mut locks = self.locks.lock().await;
        let mut removed = Vec::new();
        for lock_id in lock_ids {
            if locks.get(lock_id).is_some_and(|lock| lock.owner() == owner) {
                locks.remove(lock_id);
                removed.push(lock_id.clone());
            }
        }

        Ok(removed)
    }

    async fn find(&self, lock_id: &LockId) -> AppResult<Option<Lock>> {
        Ok(self.locks.lock().await.get(lock_id).cloned())
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut locks = self.locks.lock().await;
        let initial = locks.len();
        locks.retain(|_, lock| lock.expires_at() >= before);

        Ok(u64::try_from(initial - locks.len()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests;
