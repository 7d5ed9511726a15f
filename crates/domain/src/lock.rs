//! Lock lease entity and its validated value types.
//!
//! A lock row is only meaningful relative to an instant: a row whose
//! `expires_at` is not after that instant is free, whether or not it is still
//! physically stored.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Duration, Utc};
use pit_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Lease applied when a request does not carry `expiryInSec`.
pub const DEFAULT_LEASE_SECONDS: u32 = 60;

/// Longest lease a single acquire or keep-alive may request (7 days).
pub const MAX_LEASE_SECONDS: u32 = 604_800;

const MAX_IDENTIFIER_LENGTH: usize = 255;

fn validated_identifier(field: &str, value: String) -> AppResult<NonEmptyString> {
    let value = NonEmptyString::new(value)
        .map_err(|_| AppError::Validation(format!("{field} must not be empty")))?;

    if value.as_str().chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(AppError::Validation(format!(
            "{field} must not exceed {MAX_IDENTIFIER_LENGTH} characters"
        )));
    }

    Ok(value)
}

/// Identifier of the guarded resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockId(NonEmptyString);

impl LockId {
    /// Creates a validated lock identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        validated_identifier("lockId", value.into()).map(Self)
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for LockId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl From<LockId> for String {
    fn from(value: LockId) -> Self {
        value.0.into()
    }
}

/// Identity string of a lease holder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockOwner(NonEmptyString);

impl LockOwner {
    /// Creates a validated owner identity.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        validated_identifier("owner", value.into()).map(Self)
    }

    /// Returns the owner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for LockOwner {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Validated lease length in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeaseDuration(u32);

impl LeaseDuration {
    /// Creates a lease duration from a requested number of seconds.
    ///
    /// Accepts a signed value so that negative wire input is reported as a
    /// validation error rather than a decoding failure.
    pub fn from_seconds(seconds: i64) -> AppResult<Self> {
        if seconds <= 0 {
            return Err(AppError::Validation(
                "expiryInSec must be greater than zero".to_owned(),
            ));
        }

        if seconds > i64::from(MAX_LEASE_SECONDS) {
            return Err(AppError::Validation(format!(
                "expiryInSec must not exceed {MAX_LEASE_SECONDS}"
            )));
        }

        u32::try_from(seconds)
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid expiryInSec: {error}")))
    }

    /// Resolves an optional request value against a fallback lease.
    pub fn from_optional_seconds(seconds: Option<i64>, fallback: Self) -> AppResult<Self> {
        seconds.map_or(Ok(fallback), Self::from_seconds)
    }

    /// Returns the lease length in seconds.
    #[must_use]
    pub fn as_seconds(self) -> u32 {
        self.0
    }

    /// Returns the instant this lease ends when started at `start`.
    pub fn expires_at(self, start: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        start
            .checked_add_signed(Duration::seconds(i64::from(self.0)))
            .ok_or_else(|| AppError::Validation("lease expiry is out of range".to_owned()))
    }
}

impl Default for LeaseDuration {
    fn default() -> Self {
        Self(DEFAULT_LEASE_SECONDS)
    }
}

/// One stored lock row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    lock_id: LockId,
    owner: LockOwner,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Lock {
    /// Creates a lock row value.
    #[must_use]
    pub fn new(
        lock_id: LockId,
        owner: LockOwner,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            lock_id,
            owner,
            created_at,
            expires_at,
        }
    }

    /// Returns the guarded resource identifier.
    #[must_use]
    pub fn lock_id(&self) -> &LockId {
        &self.lock_id
    }

    /// Returns the holder identity.
    #[must_use]
    pub fn owner(&self) -> &LockOwner {
        &self.owner
    }

    /// Returns when the current holding period began.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the lease ends.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns whether the lease is still live at `now`.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Returns whether `owner` holds a live lease at `now`.
    #[must_use]
    pub fn is_held_by(&self, owner: &LockOwner, now: DateTime<Utc>) -> bool {
        self.is_live_at(now) && &self.owner == owner
    }

    /// Returns the logical state of this row at `now`.
    #[must_use]
    pub fn state_at(&self, now: DateTime<Utc>) -> LockState {
        LockState::of(Some(self), now)
    }
}

/// Logical state of one lock identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockState {
    /// No live lease exists.
    Free,
    /// A live lease is held.
    Held {
        /// Current holder.
        owner: LockOwner,
        /// End of the current lease.
        expires_at: DateTime<Utc>,
    },
}

impl LockState {
    /// Derives the state from an optional stored row.
    #[must_use]
    pub fn of(lock: Option<&Lock>, now: DateTime<Utc>) -> Self {
        match lock {
            Some(lock) if lock.is_live_at(now) => Self::Held {
                owner: lock.owner.clone(),
                expires_at: lock.expires_at,
            },
            _ => Self::Free,
        }
    }

    /// Returns whether the lock can be acquired.
    #[must_use]
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }
}
