//! Lease-based lock service.
//!
//! Every operation is a single non-blocking attempt against the [`LockStore`].
//! Contention and ownership mismatches are ordinary results; only storage
//! failures surface as errors.

use std::collections::HashSet;
use std::sync::Arc;

use pit_core::{AppError, AppResult};
use pit_domain::{LeaseDuration, LockId};

use crate::lock_ports::{Clock, LockStore};

mod acquire;
mod batch;
mod inspection;

/// Largest number of ids accepted by one release or keep-alive call.
pub const MAX_BATCH_LOCK_IDS: usize = 1_000;

/// Immutable lock service settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockServiceConfig {
    default_lease: LeaseDuration,
}

impl LockServiceConfig {
    /// Creates settings with the lease applied when a request has no expiry.
    pub fn new(default_lease_seconds: u32) -> AppResult<Self> {
        Ok(Self {
            default_lease: LeaseDuration::from_seconds(i64::from(default_lease_seconds))?,
        })
    }

    /// Returns the fallback lease.
    #[must_use]
    pub fn default_lease(&self) -> LeaseDuration {
        self.default_lease
    }
}

/// Application service for acquire, release and keep-alive.
#[derive(Clone)]
pub struct LockService {
    store: Arc<dyn LockStore>,
    clock: Arc<dyn Clock>,
    config: LockServiceConfig,
}

impl LockService {
    /// Creates a lock service.
    #[must_use]
    pub fn new(store: Arc<dyn LockStore>, clock: Arc<dyn Clock>, config: LockServiceConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Returns the service settings.
    #[must_use]
    pub fn config(&self) -> LockServiceConfig {
        self.config
    }

    fn lease_for(&self, expiry_in_sec: Option<i64>) -> AppResult<LeaseDuration> {
        LeaseDuration::from_optional_seconds(expiry_in_sec, self.config.default_lease)
    }
}

/// Validates a batch of ids, dropping repeats after the first occurrence.
fn validated_lock_ids(lock_ids: Vec<String>) -> AppResult<Vec<LockId>> {
    if lock_ids.len() > MAX_BATCH_LOCK_IDS {
        return Err(AppError::Validation(format!(
            "lockIds must not contain more than {MAX_BATCH_LOCK_IDS} entries"
        )));
    }

    let mut seen = HashSet::with_capacity(lock_ids.len());
    let mut validated = Vec::with_capacity(lock_ids.len());
    for raw in lock_ids {
        let lock_id = LockId::new(raw)?;
        if seen.insert(lock_id.clone()) {
            validated.push(lock_id);
        }
    }

    Ok(validated)
}

/// Keeps the requested ids the store reported as matched, in request order.
fn in_request_order(requested: Vec<LockId>, matched: Vec<LockId>) -> Vec<String> {
    let matched: HashSet<LockId> = matched.into_iter().collect();
    requested
        .into_iter()
        .filter(|lock_id| matched.contains(lock_id))
        .map(String::from)
        .collect()
}
