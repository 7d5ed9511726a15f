use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use pit_application::{LeaseRenewal, LockLease, LockService, LockServiceConfig, LockStore};
use pit_core::{AppError, AppResult};
use pit_domain::{Lock, LockId, LockOwner};
use pit_infrastructure::{InMemoryLockStore, SystemClock};

use super::{
    acquire_lock_handler, describe_lock_handler, keep_alive_handler, release_locks_handler,
};
use crate::dto::{AcquireLockRequest, KeepAliveRequest, ReleaseLocksRequest};
use crate::state::{AppState, StorageProbe};

struct UnreachableLockStore;

#[async_trait]
impl LockStore for UnreachableLockStore {
    async fn try_acquire(&self, _lease: &LockLease) -> AppResult<bool> {
        Err(AppError::Unavailable("pool timed out".to_owned()))
    }

    async fn extend_expiry(&self, _renewal: &LeaseRenewal) -> AppResult<Vec<LockId>> {
        Err(AppError::Unavailable("pool timed out".to_owned()))
    }

    async fn remove_if_owned(
        &self,
        _lock_ids: &[LockId],
        _owner: &LockOwner,
    ) -> AppResult<Vec<LockId>> {
        Err(AppError::Unavailable("pool timed out".to_owned()))
    }

    async fn find(&self, _lock_id: &LockId) -> AppResult<Option<Lock>> {
        Err(AppError::Unavailable("pool timed out".to_owned()))
    }

    async fn purge_expired(&self, _before: DateTime<Utc>) -> AppResult<u64> {
        Err(AppError::Unavailable("pool timed out".to_owned()))
    }
}

fn state_with(store: Arc<dyn LockStore>) -> AppState {
    AppState {
        lock_service: LockService::new(
            store,
            Arc::new(SystemClock::new()),
            LockServiceConfig::default(),
        ),
        storage: StorageProbe::Memory,
    }
}

fn in_memory_state() -> AppState {
    state_with(Arc::new(InMemoryLockStore::new()))
}

fn acquire_request(lock_id: &str, owner: &str) -> AcquireLockRequest {
    AcquireLockRequest {
        lock_id: Some(lock_id.to_owned()),
        owner: Some(owner.to_owned()),
        expiry_in_sec: Some(10),
    }
}

async fn acquire(state: &AppState, lock_id: &str, owner: &str) -> bool {
    match acquire_lock_handler(
        State(state.clone()),
        Ok(Json(acquire_request(lock_id, owner))),
    )
    .await
    {
        Ok(Json(response)) => {
            assert_eq!(response.lock_id, lock_id);
            response.acquired
        }
        Err(error) => panic!("acquire failed: {:?}", error.0),
    }
}

#[tokio::test]
async fn second_owner_is_refused_while_lock_is_held() {
    let state = in_memory_state();

    assert!(acquire(&state, "L1", "A").await);
    assert!(!acquire(&state, "L1", "B").await);
}

#[tokio::test]
async fn release_returns_only_owned_ids() {
    let state = in_memory_state();
    assert!(acquire(&state, "L1", "A").await);
    assert!(acquire(&state, "L2", "B").await);

    let released = release_locks_handler(
        State(state.clone()),
        Ok(Json(ReleaseLocksRequest {
            lock_ids: Some(vec!["L1".to_owned(), "L2".to_owned(), "L3".to_owned()]),
            owner: Some("A".to_owned()),
        })),
    )
    .await;

    assert!(matches!(released, Ok(Json(ref ids)) if ids == &vec!["L1".to_owned()]));
}

#[tokio::test]
async fn keep_alive_by_non_owner_returns_empty_list() {
    let state = in_memory_state();
    assert!(acquire(&state, "L1", "A").await);

    let extended = keep_alive_handler(
        State(state.clone()),
        Ok(Json(KeepAliveRequest {
            lock_ids: Some(vec!["L1".to_owned()]),
            owner: Some("B".to_owned()),
            expiry_in_sec: Some(10),
        })),
    )
    .await;

    assert!(matches!(extended, Ok(Json(ref ids)) if ids.is_empty()));
}

#[tokio::test]
async fn missing_owner_is_bad_request() {
    let state = in_memory_state();

    let result = acquire_lock_handler(
        State(state),
        Ok(Json(AcquireLockRequest {
            lock_id: Some("L1".to_owned()),
            ..AcquireLockRequest::default()
        })),
    )
    .await;

    let Err(error) = result else {
        panic!("missing owner must be rejected");
    };
    assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_lock_ids_is_bad_request() {
    let state = in_memory_state();

    let result = keep_alive_handler(
        State(state),
        Ok(Json(KeepAliveRequest {
            owner: Some("A".to_owned()),
            ..KeepAliveRequest::default()
        })),
    )
    .await;

    let Err(error) = result else {
        panic!("missing lockIds must be rejected");
    };
    assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unreachable_storage_is_service_unavailable() {
    let state = state_with(Arc::new(UnreachableLockStore));

    let result = acquire_lock_handler(State(state), Ok(Json(acquire_request("L1", "A")))).await;

    let Err(error) = result else {
        panic!("storage failure must not look like contention");
    };
    assert_eq!(
        error.into_response().status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn describe_reports_holder_or_not_found() {
    let state = in_memory_state();
    assert!(acquire(&state, "L1", "A").await);

    let held = describe_lock_handler(State(state.clone()), Path("L1".to_owned())).await;
    assert!(matches!(held, Ok(Json(ref metadata)) if metadata.owner == "A"));

    let free = describe_lock_handler(State(state), Path("L2".to_owned())).await;
    let Err(error) = free else {
        panic!("free lock must be reported as not found");
    };
    assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
}
