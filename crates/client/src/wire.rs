use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AcquireRequest<'a> {
    pub(crate) lock_id: &'a str,
    pub(crate) owner: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) expiry_in_sec: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LockBatchRequest<'a> {
    pub(crate) lock_ids: &'a [String],
    pub(crate) owner: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) expiry_in_sec: Option<u32>,
}

/// Outcome of one acquire attempt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquireResponse {
    /// Requested lock.
    pub lock_id: String,
    /// Whether the caller now holds the lock.
    pub acquired: bool,
}

/// Live holder of a lock.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockDescription {
    /// Inspected lock.
    pub lock_id: String,
    /// Current holder.
    pub owner: String,
    /// Start of the current holding period.
    pub created_at: DateTime<Utc>,
    /// End of the current lease.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) message: String,
}
