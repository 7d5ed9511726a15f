use pit_core::AppResult;
use pit_domain::{LockId, LockOwner};
use tracing::debug;

use crate::lock_ports::{AcquireLockInput, LockAcquisition, LockLease};

use super::LockService;

impl LockService {
    /// Attempts to acquire one lock for `input.owner`.
    ///
    /// Returns `acquired: false` when another live lease exists, including
    /// one held by the same owner.
    pub async fn acquire(&self, input: AcquireLockInput) -> AppResult<LockAcquisition> {
        let lock_id = LockId::new(input.lock_id)?;
        let owner = LockOwner::new(input.owner)?;
        let duration = self.lease_for(input.expiry_in_sec)?;

        let acquired_at = self.clock.now();
        let lease = LockLease {
            lock_id,
            owner,
            acquired_at,
            expires_at: duration.expires_at(acquired_at)?,
        };

        let acquired = self.store.try_acquire(&lease).await?;
        debug!(
            lock_id = %lease.lock_id,
            owner = %lease.owner,
            acquired,
            expires_at = %lease.expires_at,
            "lock acquire attempted"
        );

        Ok(LockAcquisition {
            lock_id: lease.lock_id.into(),
            acquired,
        })
    }
}
