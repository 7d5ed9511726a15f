use chrono::Duration;
use pit_core::{AppError, AppResult};
use pit_domain::LockId;
use tracing::info;

use crate::lock_ports::LockMetadata;

use super::LockService;

impl LockService {
    /// Returns the live holder of `lock_id`, or `None` when the lock is free.
    pub async fn describe(&self, lock_id: &str) -> AppResult<Option<LockMetadata>> {
        let lock_id = LockId::new(lock_id)?;
        let now = self.clock.now();

        Ok(self
            .store
            .find(&lock_id)
            .await?
            .filter(|lock| lock.is_live_at(now))
            .map(|lock| LockMetadata::from(&lock)))
    }

    /// Deletes rows that expired more than `grace` ago.
    ///
    /// Live leases are never touched, so this is safe to run concurrently
    /// with lock traffic.
    pub async fn purge_expired(&self, grace: Duration) -> AppResult<u64> {
        if grace < Duration::zero() {
            return Err(AppError::Validation(
                "purge grace period must not be negative".to_owned(),
            ));
        }

        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(grace)
            .ok_or_else(|| AppError::Validation("purge grace period is out of range".to_owned()))?;

        let purged = self.store.purge_expired(cutoff).await?;
        if purged > 0 {
            info!(purged, cutoff = %cutoff, "purged expired locks");
        }

        Ok(purged)
    }
}
