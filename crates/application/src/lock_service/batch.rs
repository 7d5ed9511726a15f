use pit_core::AppResult;
use pit_domain::LockOwner;
use tracing::debug;

use crate::lock_ports::{KeepAliveInput, LeaseRenewal, ReleaseLocksInput};

use super::{LockService, in_request_order, validated_lock_ids};

impl LockService {
    /// Releases every listed lock owned by `input.owner`.
    ///
    /// Returns the ids actually removed, in request order. Absent and foreign
    /// locks are omitted, which makes repeated releases harmless.
    pub async fn release(&self, input: ReleaseLocksInput) -> AppResult<Vec<String>> {
        let owner = LockOwner::new(input.owner)?;
        let lock_ids = validated_lock_ids(input.lock_ids)?;
        if lock_ids.is_empty() {
            return Ok(Vec::new());
        }

        let removed = self.store.remove_if_owned(&lock_ids, &owner).await?;
        let released = in_request_order(lock_ids, removed);

        debug!(owner = %owner, released = released.len(), "locks released");
        Ok(released)
    }

    /// Extends every listed live lease owned by `input.owner`.
    ///
    /// A lease never ends earlier than previously granted. Returns the ids of
    /// the live owned leases, in request order.
    pub async fn keep_alive(&self, input: KeepAliveInput) -> AppResult<Vec<String>> {
        let owner = LockOwner::new(input.owner)?;
        let lease = self.lease_for(input.expiry_in_sec)?;
        let lock_ids = validated_lock_ids(input.lock_ids)?;
        if lock_ids.is_empty() {
            return Ok(Vec::new());
        }

        let renewed_at = self.clock.now();
        let expires_at = lease.expires_at(renewed_at)?;

        let renewal = LeaseRenewal {
            lock_ids,
            owner,
            renewed_at,
            expires_at,
        };
        let matched = self.store.extend_expiry(&renewal).await?;
        let extended = in_request_order(renewal.lock_ids, matched);

        debug!(
            owner = %renewal.owner,
            extended = extended.len(),
            expires_at = %expires_at,
            "lock leases extended"
        );
        Ok(extended)
    }
}
