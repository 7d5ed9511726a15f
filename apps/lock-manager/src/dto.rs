use chrono::SecondsFormat;
use pit_application::{LockAcquisition, LockMetadata};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for one acquire attempt.
///
/// Identifier fields are optional on the wire so that a missing field is
/// reported as a validation error by the lock service.
#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/lock-api-types/src/generated/acquire-lock-request.ts"
)]
pub struct AcquireLockRequest {
    #[serde(default)]
    pub lock_id: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub expiry_in_sec: Option<i64>,
}

/// Incoming payload for releasing locks.
#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/lock-api-types/src/generated/release-locks-request.ts"
)]
pub struct ReleaseLocksRequest {
    #[serde(default)]
    pub lock_ids: Option<Vec<String>>,
    #[serde(default)]
    pub owner: Option<String>,
}

/// Incoming payload for extending leases.
#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/lock-api-types/src/generated/keep-alive-request.ts"
)]
pub struct KeepAliveRequest {
    #[serde(default)]
    pub lock_ids: Option<Vec<String>>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub expiry_in_sec: Option<i64>,
}

/// Outcome of one acquire attempt.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/lock-api-types/src/generated/acquire-lock-response.ts"
)]
pub struct AcquireLockResponse {
    pub lock_id: String,
    pub acquired: bool,
}

impl From<LockAcquisition> for AcquireLockResponse {
    fn from(value: LockAcquisition) -> Self {
        Self {
            lock_id: value.lock_id,
            acquired: value.acquired,
        }
    }
}

/// Live holder of one lock.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/lock-api-types/src/generated/lock-metadata-response.ts"
)]
pub struct LockMetadataResponse {
    pub lock_id: String,
    pub owner: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp.
    pub expires_at: String,
}

impl From<LockMetadata> for LockMetadataResponse {
    fn from(value: LockMetadata) -> Self {
        Self {
            lock_id: value.lock_id,
            owner: value.owner,
            created_at: value.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            expires_at: value.expires_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Status of one backing dependency.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/lock-api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/lock-api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub storage: HealthDependencyStatus,
}
