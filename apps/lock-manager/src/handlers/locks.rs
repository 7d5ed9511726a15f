use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use pit_application::{AcquireLockInput, KeepAliveInput, ReleaseLocksInput};
use pit_core::AppError;

use crate::dto::{
    AcquireLockRequest, AcquireLockResponse, KeepAliveRequest, LockMetadataResponse,
    ReleaseLocksRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn acquire_lock_handler(
    State(state): State<AppState>,
    payload: Result<Json<AcquireLockRequest>, JsonRejection>,
) -> ApiResult<Json<AcquireLockResponse>> {
    let Json(payload) = payload?;
    let acquisition = state
        .lock_service
        .acquire(AcquireLockInput {
            lock_id: payload.lock_id.unwrap_or_default(),
            owner: payload.owner.unwrap_or_default(),
            expiry_in_sec: payload.expiry_in_sec,
        })
        .await?;

    Ok(Json(AcquireLockResponse::from(acquisition)))
}

pub async fn release_locks_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReleaseLocksRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<String>>> {
    let Json(payload) = payload?;
    let released = state
        .lock_service
        .release(ReleaseLocksInput {
            lock_ids: required_lock_ids(payload.lock_ids)?,
            owner: payload.owner.unwrap_or_default(),
        })
        .await?;

    Ok(Json(released))
}

pub async fn keep_alive_handler(
    State(state): State<AppState>,
    payload: Result<Json<KeepAliveRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<String>>> {
    let Json(payload) = payload?;
    let extended = state
        .lock_service
        .keep_alive(KeepAliveInput {
            lock_ids: required_lock_ids(payload.lock_ids)?,
            owner: payload.owner.unwrap_or_default(),
            expiry_in_sec: payload.expiry_in_sec,
        })
        .await?;

    Ok(Json(extended))
}

pub async fn describe_lock_handler(
    State(state): State<AppState>,
    Path(lock_id): Path<String>,
) -> ApiResult<Json<LockMetadataResponse>> {
    let metadata = state
        .lock_service
        .describe(lock_id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("lock '{lock_id}' is not held")))?;

    Ok(Json(LockMetadataResponse::from(metadata)))
}

fn required_lock_ids(lock_ids: Option<Vec<String>>) -> Result<Vec<String>, AppError> {
    lock_ids.ok_or_else(|| AppError::Validation("lockIds is required".to_owned()))
}

#[cfg(test)]
mod tests;
